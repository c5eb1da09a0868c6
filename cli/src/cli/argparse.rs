use std::path::PathBuf;

use clap::Parser;

const PNG_OUTPUT_DEFAULT: &str = "out.png";

pub fn get_args() -> CliOpts {
    CliOpts::parse()
}

#[derive(Parser, Debug)]
#[command(version = clap::crate_version!(), about = "Run the lamp functions outside of lambda")]
pub struct CliOpts {
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Parser, Debug)]
pub enum SubCommand {
    /// Render a label to a PNG file
    Render(RenderOpts),

    /// Feed an event to the image processor
    Dispatch(DispatchOpts),

    /// Show the resolved configuration
    ShowConfig(ShowConfig),
}

#[derive(Parser, Debug)]
pub struct RenderOpts {
    /// Text to draw, defaults to the configured `default_text`
    #[arg(long)]
    pub text: Option<String>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Output png file
    #[arg(long, short, default_value = PNG_OUTPUT_DEFAULT)]
    pub output: PathBuf,

    /// Print the full function response instead of writing a file
    #[arg(long)]
    pub envelope: bool,

    #[command(flatten)]
    pub cfg: AppConfig,
}

#[derive(Parser, Debug)]
pub struct DispatchOpts {
    /// JSON event file. Reads stdin when omitted or `-`.
    pub event: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreConfig,

    #[command(flatten)]
    pub cfg: AppConfig,
}

#[derive(Parser, Debug)]
pub struct ShowConfig {
    #[command(flatten)]
    pub cfg: AppConfig,
}

#[derive(Parser, Debug)]
pub struct StoreConfig {
    /// Write processed artifacts below this directory as `<bucket>/<key>`
    #[arg(long, default_value = "lamp-store")]
    pub store_dir: PathBuf,

    /// Write processed artifacts to S3
    #[cfg(feature = "aws-sdk")]
    #[arg(long)]
    pub s3: bool,
}

#[derive(Parser, Debug)]
pub struct AppConfig {
    /// Path to a lamp.toml config file.
    ///
    /// If not provided, will look in user dirs.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// AWS region used in returned object urls
    #[arg(long)]
    pub region: Option<String>,

    /// Directory of extra fonts to load
    #[arg(long)]
    pub font_dir: Option<PathBuf>,

    /// Simulated processing time for uploads, in milliseconds
    #[arg(long)]
    pub processing_delay_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        CliOpts::command().debug_assert();
    }

    #[test]
    fn verbosity_counts() {
        let args = CliOpts::parse_from(["lamp", "-vv", "show-config"]);
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.subcmd, SubCommand::ShowConfig(_)));
    }

    #[test]
    fn render_defaults() {
        let args = CliOpts::parse_from(["lamp", "render", "--text", "hi"]);
        let SubCommand::Render(opts) = args.subcmd else {
            panic!("expected render");
        };
        assert_eq!(opts.text.as_deref(), Some("hi"));
        assert_eq!(opts.width, None);
        assert_eq!(opts.output, PathBuf::from("out.png"));
        assert!(!opts.envelope);
    }

    #[test]
    fn dispatch_reads_event_path_and_store() {
        let args = CliOpts::parse_from([
            "lamp",
            "dispatch",
            "event.json",
            "--store-dir",
            "/tmp/lamp",
            "--region",
            "eu-west-1",
        ]);
        let SubCommand::Dispatch(opts) = args.subcmd else {
            panic!("expected dispatch");
        };
        assert_eq!(opts.event, Some(PathBuf::from("event.json")));
        assert_eq!(opts.store.store_dir, PathBuf::from("/tmp/lamp"));
        assert_eq!(opts.cfg.region.as_deref(), Some("eu-west-1"));
    }
}
