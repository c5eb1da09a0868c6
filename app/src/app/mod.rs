use std::{path::Path, sync::Arc};

use crate::{
    processor::ImageProcessor,
    render::Renderer,
    storage::{LocalObjectStore, ObjectStore, StoreError},
    LampAppError,
};

mod lamp_config;

pub use lamp_config::{AppConfig, ConfigBuilder, ConfigError};

#[derive(Debug)]
pub struct LampBuilder {
    pub config: lamp_config::ConfigBuilder,
}

impl LampBuilder {
    /// Defaults overlaid with `LAMP_*` environment variables. This is what
    /// the lambda functions run with.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(LampBuilder {
            config: lamp_config::ConfigBuilder::new()?.load_environment(true),
        })
    }

    /// Like [`LampBuilder::new`], but also reads `lamp.toml` from the user's
    /// config directory when present.
    pub fn new_with_user_dirs() -> Result<Self, ConfigError> {
        Ok(LampBuilder {
            config: lamp_config::ConfigBuilder::new_with_user_dirs()?.load_environment(true),
        })
    }

    pub fn build_renderer(self) -> Result<Renderer, LampAppError> {
        let config = self.config.build()?;
        Ok(Renderer::new(config.render_settings()?))
    }

    pub fn build_with_store(self, store: Arc<dyn ObjectStore>) -> Result<LampApp, LampAppError> {
        let config = self.config.build()?;
        let processor = ImageProcessor::new(store, config.processor_settings()?);
        let app = LampApp { config, processor };
        log::trace!("{:#?}", app);
        Ok(app)
    }

    /// Write artifacts below `root` instead of to S3.
    pub fn build_local(self, root: &Path) -> Result<LampApp, LampAppError> {
        std::fs::create_dir_all(root).map_err(StoreError::from)?;
        log::debug!("using local object store at: {:?}", root);
        self.build_with_store(Arc::new(LocalObjectStore::new(root)))
    }

    /// Resolve credentials and region the way the AWS sdk does. The sdk's
    /// region only fills in when the configuration does not name one.
    #[cfg(feature = "aws-sdk")]
    pub async fn build_s3(self) -> Result<LampApp, LampAppError> {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = self;
        if let Some(region) = sdk_config.region() {
            builder.config = builder.config.default_region(region.as_ref())?;
        }
        let config = builder.config.build()?;
        let region = config.region()?;
        log::debug!("using s3 in region: {}", region);

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .region(aws_sdk_s3::config::Region::new(region))
            .build();
        let client = aws_sdk_s3::Client::from_conf(s3_config);
        let store = Arc::new(crate::storage::S3ObjectStore::new(client));

        let processor = ImageProcessor::new(store, config.processor_settings()?);
        let app = LampApp { config, processor };
        log::trace!("{:#?}", app);
        Ok(app)
    }
}

#[derive(Debug)]
pub struct LampApp {
    pub config: lamp_config::AppConfig,
    pub processor: ImageProcessor,
}

impl LampApp {
    pub fn renderer(&self) -> Result<Renderer, LampAppError> {
        Ok(Renderer::new(self.config.render_settings()?))
    }
}
