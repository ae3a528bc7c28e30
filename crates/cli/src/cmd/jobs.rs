use anyhow::{Context, Result};
use argp::FromArgs;
use run_notify_core::{models::completed_outcomes, reduce};
use run_notify_github::GitHub;

use crate::{actions, cmd::RunSelector, util::repository};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// List the completed jobs of a workflow run and the resulting verdict.
#[argp(subcommand, name = "jobs")]
pub struct Args {
    #[argp(option)]
    /// GitHub token (default: $GITHUB_TOKEN or the github-token input)
    token: Option<String>,
    #[argp(option)]
    /// workflow run ID (default: $GITHUB_RUN_ID)
    run_id: Option<u64>,
    #[argp(option, from_str_fn(repository))]
    /// repository as owner/repo (default: $GITHUB_REPOSITORY)
    repository: Option<String>,
}

pub async fn run(args: Args) -> Result<()> {
    let token = args
        .token
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .or_else(|| Some(actions::input("github-token")))
        .filter(|t| !t.trim().is_empty())
        .context("No GitHub token given")?;
    actions::add_mask(&token);

    let selector = RunSelector { run_id: args.run_id, repository: args.repository, workflow: None };
    let run = selector.resolve(with_workflow_fallback(|name| std::env::var(name).ok()))?;

    let github = GitHub::new(&token)?;
    let jobs = completed_outcomes(github.list_run_jobs(&run.owner, &run.repo, run.run_id).await?);
    for job in &jobs {
        let status = job.status.as_ref().map_or("unknown", |s| s.as_str());
        println!("{}\t{}\t{}", job.name, status, job.url);
    }
    println!("{}", reduce(&jobs).label());
    Ok(())
}

/// The workflow name is only used for display here, so a missing or blank one
/// becomes `-`.
fn with_workflow_fallback(
    env: impl Fn(&str) -> Option<String>,
) -> impl Fn(&str) -> Option<String> {
    move |name: &str| {
        let value = env(name).filter(|v| !v.trim().is_empty());
        match name {
            "GITHUB_WORKFLOW" => value.or_else(|| Some(String::from("-"))),
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> RunSelector { RunSelector { run_id: None, repository: None, workflow: None } }

    #[test]
    fn test_workflow_fallback() {
        let cases: &[(Option<&str>, &str)] =
            &[(None, "-"), (Some(""), "-"), (Some("  "), "-"), (Some("CI"), "CI")];
        for &(workflow, expected) in cases {
            let env = with_workflow_fallback(|name: &str| match name {
                "GITHUB_RUN_ID" => Some("5".to_string()),
                "GITHUB_REPOSITORY" => Some("octo/widgets".to_string()),
                "GITHUB_WORKFLOW" => workflow.map(str::to_string),
                _ => None,
            });
            let run = selector().resolve(env).unwrap();
            assert_eq!(run.workflow, expected, "workflow: {workflow:?}");
        }
    }
}
