pub mod app;
pub mod processor;
pub mod render;
pub mod storage;

#[derive(Debug, thiserror::Error)]
pub enum LampAppError {
    #[error(transparent)]
    Config(#[from] app::ConfigError),
    #[error(transparent)]
    Store(#[from] storage::StoreError),
    #[error(transparent)]
    Render(#[from] render::RenderError),
}
