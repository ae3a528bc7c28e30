mod actions;
mod cmd;
mod util;

use std::process::ExitCode;

use argp::FromArgs;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(FromArgs, PartialEq, Debug)]
/// Workflow run status notifications.
struct TopLevel {
    #[argp(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argp(subcommand)]
enum SubCommand {
    Notify(cmd::notify::Args),
    Jobs(cmd::jobs::Args),
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);
    let result = match args.command {
        SubCommand::Notify(args) => cmd::notify::run(args).await,
        SubCommand::Jobs(args) => cmd::jobs::run(args).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:?}", e);
            actions::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
