use std::future::Future;

use anyhow::{Context, Result, anyhow, bail};
use http::StatusCode;
use octocrab::{GitHubError, Octocrab};
use run_notify_core::models::JobRecord;
use serde::Deserialize;

const PER_PAGE: u8 = 100;

#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
}

#[derive(serde::Serialize)]
struct ListJobsParams {
    filter: &'static str,
    per_page: u8,
    page: u32,
}

/// One page of the "list jobs for a workflow run" response.
#[derive(Debug, Deserialize)]
pub struct JobsPage {
    pub total_count: usize,
    pub jobs: Vec<JobRecord>,
}

impl GitHub {
    pub fn new(token: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { client })
    }

    /// Fetch every job of a workflow run, across all pages.
    pub async fn list_run_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<Vec<JobRecord>> {
        let route = format!("/repos/{owner}/{repo}/actions/runs/{run_id}/jobs");
        let client = &self.client;
        let jobs = collect_pages(|page| {
            let route = route.as_str();
            async move {
                let params = ListJobsParams { filter: "latest", per_page: PER_PAGE, page };
                match client.get::<JobsPage, _, _>(route, Some(&params)).await {
                    Ok(page) => Ok(page),
                    Err(octocrab::Error::GitHub { source, .. })
                        if matches!(*source, GitHubError {
                            status_code: StatusCode::NOT_FOUND,
                            ..
                        }) =>
                    {
                        Err(anyhow!("Workflow run {run_id} not found in {owner}/{repo}"))
                    }
                    Err(e) => Err(e).with_context(|| format!("Failed to fetch jobs page {page}")),
                }
            }
        })
        .await
        .with_context(|| format!("Failed to list jobs for run {run_id}"))?;
        tracing::info!("Fetched {} jobs for run {} in {}/{}", jobs.len(), run_id, owner, repo);
        Ok(jobs)
    }
}

async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<JobRecord>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<JobsPage>>,
{
    let mut page = 1;
    let mut response = fetch(page).await?;
    let mut jobs = response.jobs;
    while jobs.len() < response.total_count {
        page += 1;
        response = fetch(page).await?;
        if response.jobs.is_empty() {
            tracing::warn!(
                "Expected {} jobs but page {} was empty after {}",
                response.total_count,
                page,
                jobs.len()
            );
            break;
        }
        jobs.extend(response.jobs);
    }
    Ok(jobs)
}

/// Split a `GITHUB_REPOSITORY` value into owner and name.
pub fn parse_repository(value: &str) -> Result<(&str, &str)> {
    match value.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => bail!("Invalid repository '{value}', expected owner/repo"),
    }
}
