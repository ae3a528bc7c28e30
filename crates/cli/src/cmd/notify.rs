use std::path::PathBuf;

use anyhow::{Context, Result};
use argp::FromArgs;
use run_notify_core::{Config, Notification};
use run_notify_discord::Discord;
use run_notify_github::GitHub;

use crate::{
    actions,
    cmd::RunSelector,
    util::{path, repository},
};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Report the status of a workflow run to a Discord webhook.
#[argp(subcommand, name = "notify")]
pub struct Args {
    #[argp(option, short = 'c', from_str_fn(path))]
    /// read configuration from a YAML file instead of action inputs
    config: Option<PathBuf>,
    #[argp(option)]
    /// workflow run ID (default: $GITHUB_RUN_ID)
    run_id: Option<u64>,
    #[argp(option, from_str_fn(repository))]
    /// repository as owner/repo (default: $GITHUB_REPOSITORY)
    repository: Option<String>,
    #[argp(option)]
    /// workflow name (default: $GITHUB_WORKFLOW)
    workflow: Option<String>,
    #[argp(switch)]
    /// print the payload instead of sending it
    dry_run: bool,
}

pub async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::from_inputs(actions::input)?,
    };
    for secret in config.secrets() {
        actions::add_mask(secret);
    }

    let selector =
        RunSelector { run_id: args.run_id, repository: args.repository, workflow: args.workflow };
    let run = selector.resolve(|name| std::env::var(name).ok())?;

    let github = GitHub::new(&config.github.token)?;
    let records = github.list_run_jobs(&run.owner, &run.repo, run.run_id).await?;
    let notification = Notification::for_run(records, &run, &config);
    tracing::info!(
        "Workflow {} run {} in {}: {} ({} completed jobs)",
        run.workflow,
        run.run_id,
        run.full_name(),
        notification.verdict,
        notification.jobs.len()
    );

    if args.dry_run {
        let json = serde_json::to_string_pretty(&notification.payload)
            .context("Failed to serialize payload")?;
        println!("{json}");
        return Ok(());
    }

    let discord = Discord::new().context("Failed to create HTTP client")?;
    discord
        .execute_webhook(&config.discord.webhook, &notification.payload)
        .await
        .context("Failed to deliver notification")?;
    Ok(())
}
