use anyhow::Context;

use super::argparse;

impl argparse::ShowConfig {
    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let config = self
            .cfg
            .builder()?
            .config
            .build()
            .context("could not build config")?;
        println!("{:#?}", config.render_settings()?);
        println!("{:#?}", config.processor_settings()?);
        Ok(())
    }
}
