use std::time::Duration;

use anyhow::Context;
use app::app::LampBuilder;

use super::argparse;

impl argparse::AppConfig {
    pub(crate) fn builder(&self) -> anyhow::Result<LampBuilder> {
        let mut builder =
            LampBuilder::new_with_user_dirs().context("could not create app builder")?;
        builder.config = builder
            .config
            .config_file(self.config.as_deref())
            .context("could not set config file")?
            .region(self.region.as_deref())
            .context("could not set region")?
            .font_dir(self.font_dir.as_deref())
            .context("could not set font dir")?
            .processing_delay(self.processing_delay_ms.map(Duration::from_millis))
            .context("could not set processing delay")?;
        Ok(builder)
    }
}
