use std::path::Path;

use anyhow::Context;
use app::app::LampApp;
use tokio::io::AsyncReadExt;

use super::argparse;

async fn read_event(path: Option<&Path>) -> anyhow::Result<serde_json::Value> {
    let raw = match path {
        Some(p) if p != Path::new("-") => tokio::fs::read(p)
            .await
            .with_context(|| format!("could not read event file {:?}", p))?,
        _ => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("could not read event from stdin")?;
            buf
        }
    };
    serde_json::from_slice(&raw).context("event is not valid json")
}

impl argparse::DispatchOpts {
    async fn build_app(&self) -> anyhow::Result<LampApp> {
        let builder = self.cfg.builder()?;
        #[cfg(feature = "aws-sdk")]
        if self.store.s3 {
            return builder.build_s3().await.context("could not build s3 app");
        }
        builder
            .build_local(&self.store.store_dir)
            .context("could not build app")
    }

    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let event = read_event(self.event.as_deref()).await?;
        let app = self.build_app().await?;
        log::trace!("using app: {:?}", app);

        let resp = app.processor.handle(&event).await;
        println!("{}", serde_json::to_string_pretty(&resp)?);
        Ok(())
    }
}
