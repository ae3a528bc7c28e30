pub mod jobs;
pub mod notify;

use anyhow::{Context, Result, bail};
use run_notify_core::RunMetadata;
use run_notify_github::parse_repository;

/// Run identification given on the command line, with the Actions
/// environment filling in whatever was not.
pub struct RunSelector {
    pub run_id: Option<u64>,
    pub repository: Option<String>,
    pub workflow: Option<String>,
}

impl RunSelector {
    pub fn resolve(self, env: impl Fn(&str) -> Option<String>) -> Result<RunMetadata> {
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());
        let run_id = match self.run_id {
            Some(run_id) => run_id,
            None => {
                let Some(value) = env("GITHUB_RUN_ID") else {
                    bail!("Unable to locate the current run id");
                };
                value.trim().parse().with_context(|| format!("Invalid GITHUB_RUN_ID '{value}'"))?
            }
        };
        let Some(repository) = self.repository.or_else(|| env("GITHUB_REPOSITORY")) else {
            bail!("Unable to locate the current repository");
        };
        let (owner, repo) = parse_repository(&repository)?;
        let Some(workflow) = self.workflow.or_else(|| env("GITHUB_WORKFLOW")) else {
            bail!("Unable to locate the current workflow name");
        };
        Ok(RunMetadata { owner: owner.to_string(), repo: repo.to_string(), workflow, run_id })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(values: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = values
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name: &str| map.get(name).cloned()
    }

    fn empty() -> RunSelector { RunSelector { run_id: None, repository: None, workflow: None } }

    #[test]
    fn test_resolve_from_env() {
        let run = empty()
            .resolve(env(&[
                ("GITHUB_RUN_ID", "1658821493"),
                ("GITHUB_REPOSITORY", "octo/widgets"),
                ("GITHUB_WORKFLOW", "CI"),
            ]))
            .unwrap();
        assert_eq!(run, RunMetadata {
            owner: "octo".to_string(),
            repo: "widgets".to_string(),
            workflow: "CI".to_string(),
            run_id: 1658821493,
        });
    }

    #[test]
    fn test_resolve_prefers_arguments() {
        let selector = RunSelector {
            run_id: Some(7),
            repository: Some("other/repo".to_string()),
            workflow: Some("Release".to_string()),
        };
        let run = selector
            .resolve(env(&[
                ("GITHUB_RUN_ID", "1"),
                ("GITHUB_REPOSITORY", "octo/widgets"),
                ("GITHUB_WORKFLOW", "CI"),
            ]))
            .unwrap();
        assert_eq!(run.run_id, 7);
        assert_eq!(run.full_name(), "other/repo");
        assert_eq!(run.workflow, "Release");
    }

    #[test]
    fn test_resolve_errors() {
        let err = empty()
            .resolve(env(&[("GITHUB_REPOSITORY", "octo/widgets"), ("GITHUB_WORKFLOW", "CI")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to locate the current run id");

        let err = empty()
            .resolve(env(&[
                ("GITHUB_RUN_ID", " "),
                ("GITHUB_REPOSITORY", "octo/widgets"),
                ("GITHUB_WORKFLOW", "CI"),
            ]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to locate the current run id");

        let err = empty()
            .resolve(env(&[
                ("GITHUB_RUN_ID", "abc"),
                ("GITHUB_REPOSITORY", "octo/widgets"),
                ("GITHUB_WORKFLOW", "CI"),
            ]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid GITHUB_RUN_ID 'abc'");

        let err = empty()
            .resolve(env(&[("GITHUB_RUN_ID", "1"), ("GITHUB_REPOSITORY", "widgets")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid repository 'widgets', expected owner/repo");

        let err = empty()
            .resolve(env(&[("GITHUB_RUN_ID", "1"), ("GITHUB_REPOSITORY", "octo/widgets")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to locate the current workflow name");
    }
}
