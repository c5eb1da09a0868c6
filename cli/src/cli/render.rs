use anyhow::Context;
use app::render::RenderRequest;

use super::argparse;

impl argparse::RenderOpts {
    fn event(&self) -> serde_json::Value {
        let mut event = serde_json::Map::new();
        if let Some(text) = &self.text {
            event.insert("text".to_string(), text.as_str().into());
        }
        if let Some(width) = self.width {
            event.insert("width".to_string(), width.into());
        }
        if let Some(height) = self.height {
            event.insert("height".to_string(), height.into());
        }
        event.into()
    }

    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let renderer = self
            .cfg
            .builder()?
            .build_renderer()
            .context("could not build renderer")?;
        let event = self.event();

        if self.envelope {
            let resp = renderer.render_event(&event);
            println!("{}", serde_json::to_string_pretty(&resp)?);
            return Ok(());
        }

        let request = RenderRequest::from_event(&event, renderer.settings())?;
        let image = renderer.render(request)?;
        tokio::fs::write(&self.output, &image.png)
            .await
            .with_context(|| format!("could not write {:?}", self.output))?;
        log::info!(
            "wrote {} ({}, {} bytes)",
            self.output.display(),
            image.request.image_size(),
            image.png.len()
        );
        Ok(())
    }
}
