#[cfg(feature = "lambda")]
pub mod tracing {
    pub fn init() {
        // library crates log through `log`, the subscriber picks those up too
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            // disable printing the name of the module in every log line.
            .with_target(false)
            // disabling time is handy because CloudWatch will add the ingestion time.
            .without_time()
            .init();
    }
}

pub mod entrypoint {
    use app::{processor::ImageProcessor, render::Renderer};
    use lambda_runtime::{Error, LambdaEvent};
    use lamp_core::{ApiGatewayResponse, DispatchResponse};
    use serde_json::Value;

    /// Body of the `render` function.
    pub fn render(
        renderer: &Renderer,
        event: LambdaEvent<Value>,
    ) -> Result<ApiGatewayResponse, Error> {
        log::debug!("request id: {}", event.context.request_id);
        Ok(renderer.render_event(&event.payload))
    }

    /// Body of the `image-processor` function.
    pub async fn dispatch(
        processor: &ImageProcessor,
        event: LambdaEvent<Value>,
    ) -> Result<DispatchResponse, Error> {
        log::debug!("request id: {}", event.context.request_id);
        Ok(processor.handle(&event.payload).await)
    }
}

pub mod common {
    use anyhow::Context;

    pub fn build_renderer() -> anyhow::Result<app::render::Renderer> {
        let renderer = app::app::LampBuilder::new()
            .context("failed to read configuration")?
            .build_renderer()
            .context("could not build renderer")?;
        log::info!("renderer: {:?}", renderer.settings());
        Ok(renderer)
    }

    pub async fn build_app() -> anyhow::Result<app::app::LampApp> {
        let app = app::app::LampBuilder::new()
            .context("failed to read configuration")?
            .build_s3()
            .await
            .context("could not build app")?;
        log::info!("processor: {:?}", app.processor.settings());
        Ok(app)
    }
}
