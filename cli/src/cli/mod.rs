pub mod argparse;
mod dispatch;
mod helpers;
mod render;
mod show_config;

pub use argparse::get_args;

pub async fn run_cli(args: &argparse::CliOpts) -> anyhow::Result<()> {
    match &args.subcmd {
        argparse::SubCommand::Render(opts) => opts.run().await,
        argparse::SubCommand::Dispatch(opts) => opts.run().await,
        argparse::SubCommand::ShowConfig(opts) => opts.run().await,
    }
}
