use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use camino::{Utf8Path, Utf8PathBuf};

use crate::{
    processor::ProcessorSettings,
    render::{FontSettings, RenderSettings},
};

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "lamp";
const APP: &str = "lamp";
const APP_CAPS: &str = "LAMP";

const REGION_KEY: &str = "region";
const DEFAULT_REGION: &str = "us-east-1";

const PROCESSING_DELAY_KEY: &str = "processing_delay_ms";
const DEFAULT_PROCESSING_DELAY_MS: i64 = 500;

const UPLOADS_PREFIX_KEY: &str = "uploads_prefix";
const PROCESSED_PREFIX_KEY: &str = "processed_prefix";

const FUNCTION_NAME_KEY: &str = "function_name";
const DEFAULT_FUNCTION_NAME: &str = "image-processor";

const DEFAULT_TEXT_KEY: &str = "default_text";
const DEFAULT_TEXT: &str = "Laravel + Lambda";
const DEFAULT_WIDTH_KEY: &str = "default_width";
const DEFAULT_WIDTH: i64 = 800;
const DEFAULT_HEIGHT_KEY: &str = "default_height";
const DEFAULT_HEIGHT: i64 = 600;
const MAX_DIMENSION_KEY: &str = "max_dimension";
const DEFAULT_MAX_DIMENSION: i64 = 4096;

const FONT_DIR_KEY: &str = "font_dir";
const SYSTEM_FONTS_KEY: &str = "system_fonts";

const DEFAULT_CONFIG_FILE: &str = "lamp.toml";

type ExtConfigBuilder = config::ConfigBuilder<config::builder::DefaultState>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),
    #[error("unable to get user home directory")]
    NoUserHome,
    #[error("path is not utf8: {:?}", _0)]
    NonUtf8Path(PathBuf),
    #[error("`{key}` is out of range: {value}")]
    OutOfRange { key: &'static str, value: i64 },
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_dir: Option<Utf8PathBuf>,
    config_path: Option<Utf8PathBuf>,
    load_environment: bool,
    config_builder: ExtConfigBuilder,
}

fn camino_path(std_path: &Path) -> Result<&Utf8Path, ConfigError> {
    Utf8Path::from_path(std_path).ok_or_else(|| ConfigError::NonUtf8Path(std_path.to_path_buf()))
}

fn new_config_builder() -> Result<ExtConfigBuilder, ConfigError> {
    Ok(config::Config::builder()
        .set_default(REGION_KEY, DEFAULT_REGION)?
        .set_default(PROCESSING_DELAY_KEY, DEFAULT_PROCESSING_DELAY_MS)?
        .set_default(UPLOADS_PREFIX_KEY, lamp_core::keys::UPLOADS_PREFIX)?
        .set_default(PROCESSED_PREFIX_KEY, lamp_core::keys::PROCESSED_PREFIX)?
        .set_default(FUNCTION_NAME_KEY, DEFAULT_FUNCTION_NAME)?
        .set_default(DEFAULT_TEXT_KEY, DEFAULT_TEXT)?
        .set_default(DEFAULT_WIDTH_KEY, DEFAULT_WIDTH)?
        .set_default(DEFAULT_HEIGHT_KEY, DEFAULT_HEIGHT)?
        .set_default(MAX_DIMENSION_KEY, DEFAULT_MAX_DIMENSION)?
        .set_default(FONT_DIR_KEY, Option::<&str>::None)?
        .set_default(SYSTEM_FONTS_KEY, true)?)
}

impl ConfigBuilder {
    #[cfg(test)]
    pub fn new_test_config() -> Result<AppConfig, ConfigError> {
        let config = new_config_builder()?
            .set_override(SYSTEM_FONTS_KEY, false)?
            .build()?;
        Ok(AppConfig { inner: config })
    }

    /// Defaults only, no config file lookup in the user's directories.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            config_dir: None,
            config_path: None,
            load_environment: false,
            config_builder: new_config_builder()?,
        })
    }

    pub fn new_with_user_dirs() -> Result<Self, ConfigError> {
        let dirs = directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APP)
            .ok_or(ConfigError::NoUserHome)?;
        let config_dir = camino_path(dirs.config_dir())?.to_path_buf();
        Ok(Self {
            config_dir: Some(config_dir),
            ..Self::new()?
        })
    }

    /// Should we load configuration from the environment?
    pub fn load_environment(mut self, load_environment: bool) -> Self {
        self.load_environment = load_environment;
        self
    }

    pub fn config_file(mut self, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        self.config_path = config_file
            .map(|p| camino_path(p).map(|p| p.to_path_buf()))
            .transpose()?;
        Ok(self)
    }

    fn set_override_option<T: Into<config::Value>>(
        mut self,
        key: &str,
        value: Option<T>,
    ) -> Result<Self, ConfigError> {
        self.config_builder = self.config_builder.set_override_option(key, value)?;
        Ok(self)
    }

    /// Region used when nothing else names one. The lambda runtime feeds
    /// the region resolved by the AWS sdk in here.
    pub fn default_region(mut self, region: &str) -> Result<Self, ConfigError> {
        self.config_builder = self.config_builder.set_default(REGION_KEY, region)?;
        Ok(self)
    }

    pub fn region(self, region: Option<&str>) -> Result<Self, ConfigError> {
        self.set_override_option(REGION_KEY, region)
    }

    pub fn processing_delay(self, delay: Option<Duration>) -> Result<Self, ConfigError> {
        let millis = delay.map(|d| d.as_millis().min(i64::MAX as u128) as i64);
        self.set_override_option(PROCESSING_DELAY_KEY, millis)
    }

    pub fn font_dir(self, font_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let path_override = font_dir.map(camino_path).transpose()?;
        let str_override = path_override.map(|c| c.as_str());
        self.set_override_option(FONT_DIR_KEY, str_override)
    }

    pub fn build(mut self) -> Result<AppConfig, ConfigError> {
        if let Some(cfg_file) = &self.config_path {
            // an explicitly named file must exist
            self.config_builder = self
                .config_builder
                .add_source(config::File::from(cfg_file.as_std_path()));
        } else if let Some(config_dir) = &self.config_dir {
            let cfg_file = config_dir.join(DEFAULT_CONFIG_FILE);
            if cfg_file.exists() {
                log::debug!("loading config file: {}", cfg_file);
                self.config_builder = self
                    .config_builder
                    .add_source(config::File::from(cfg_file.as_std_path()));
            }
        }

        if self.load_environment {
            self.config_builder = self
                .config_builder
                .add_source(config::Environment::with_prefix(APP_CAPS))
        }

        let app_cfg = AppConfig {
            inner: self.config_builder.build()?,
        };
        // fail at build time on unusable values
        app_cfg.render_settings()?;
        app_cfg.processor_settings()?;
        log::trace!("{:#?}", app_cfg);
        Ok(app_cfg)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    inner: config::Config,
}

impl AppConfig {
    fn get_u32(&self, key: &'static str) -> Result<u32, ConfigError> {
        let value = self.inner.get_int(key)?;
        u32::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or(ConfigError::OutOfRange { key, value })
    }

    pub fn region(&self) -> Result<String, ConfigError> {
        Ok(self.inner.get_string(REGION_KEY)?)
    }

    pub fn processing_delay(&self) -> Result<Duration, ConfigError> {
        let value = self.inner.get_int(PROCESSING_DELAY_KEY)?;
        u64::try_from(value)
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::OutOfRange {
                key: PROCESSING_DELAY_KEY,
                value,
            })
    }

    pub fn font_dir(&self) -> Result<Option<PathBuf>, ConfigError> {
        Ok(self
            .inner
            .get::<Option<String>>(FONT_DIR_KEY)?
            .map(PathBuf::from))
    }

    pub fn render_settings(&self) -> Result<RenderSettings, ConfigError> {
        Ok(RenderSettings {
            default_text: self.inner.get_string(DEFAULT_TEXT_KEY)?,
            default_width: self.get_u32(DEFAULT_WIDTH_KEY)?,
            default_height: self.get_u32(DEFAULT_HEIGHT_KEY)?,
            max_dimension: self.get_u32(MAX_DIMENSION_KEY)?,
            fonts: FontSettings {
                system_fonts: self.inner.get_bool(SYSTEM_FONTS_KEY)?,
                font_dir: self.font_dir()?,
            },
        })
    }

    pub fn processor_settings(&self) -> Result<ProcessorSettings, ConfigError> {
        Ok(ProcessorSettings {
            uploads_prefix: self.inner.get_string(UPLOADS_PREFIX_KEY)?,
            processed_prefix: self.inner.get_string(PROCESSED_PREFIX_KEY)?,
            processing_delay: self.processing_delay()?,
            region: self.region()?,
            function_name: self.inner.get_string(FUNCTION_NAME_KEY)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_the_deployed_functions() {
        let cfg = ConfigBuilder::new().unwrap().build().unwrap();
        let render = cfg.render_settings().unwrap();
        assert_eq!(render.default_text, "Laravel + Lambda");
        assert_eq!(render.default_width, 800);
        assert_eq!(render.default_height, 600);
        assert_eq!(render.max_dimension, 4096);
        assert!(render.fonts.system_fonts);
        assert_eq!(render.fonts.font_dir, None);

        let processor = cfg.processor_settings().unwrap();
        assert_eq!(processor.uploads_prefix, "uploads/");
        assert_eq!(processor.processed_prefix, "processed/");
        assert_eq!(processor.processing_delay, Duration::from_millis(500));
        assert_eq!(processor.region, "us-east-1");
        assert_eq!(processor.function_name, "image-processor");
    }

    #[test]
    fn test_config_disables_system_fonts() {
        let cfg = ConfigBuilder::new_test_config().unwrap();
        assert!(!cfg.render_settings().unwrap().fonts.system_fonts);
    }

    #[test]
    fn overrides_beat_defaults() {
        let cfg = ConfigBuilder::new()
            .unwrap()
            .default_region("eu-west-1")
            .unwrap()
            .processing_delay(Some(Duration::from_millis(20)))
            .unwrap()
            .build()
            .unwrap();
        let processor = cfg.processor_settings().unwrap();
        assert_eq!(processor.region, "eu-west-1");
        assert_eq!(processor.processing_delay, Duration::from_millis(20));

        let cfg = ConfigBuilder::new()
            .unwrap()
            .default_region("eu-west-1")
            .unwrap()
            .region(Some("ap-south-1"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(cfg.region().unwrap(), "ap-south-1");
    }

    #[test]
    fn reads_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "region = \"sa-east-1\"").unwrap();
        writeln!(file, "max_dimension = 1024").unwrap();
        writeln!(file, "uploads_prefix = \"incoming/\"").unwrap();

        let cfg = ConfigBuilder::new()
            .unwrap()
            .config_file(Some(file.path()))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(cfg.region().unwrap(), "sa-east-1");
        assert_eq!(cfg.render_settings().unwrap().max_dimension, 1024);
        assert_eq!(cfg.processor_settings().unwrap().uploads_prefix, "incoming/");
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let res = ConfigBuilder::new()
            .unwrap()
            .config_file(Some(&dir.path().join("nope.toml")))
            .unwrap()
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn rejects_zero_dimensions() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "default_width = 0").unwrap();
        let err = ConfigBuilder::new()
            .unwrap()
            .config_file(Some(file.path()))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                key: "default_width",
                value: 0
            }
        ));
    }
}
