use std::path::PathBuf;

// For argp::FromArgs
pub fn path(value: &str) -> Result<PathBuf, String> { Ok(PathBuf::from(value)) }

// For argp::FromArgs
pub fn repository(value: &str) -> Result<String, String> {
    run_notify_github::parse_repository(value)
        .map(|(owner, repo)| format!("{owner}/{repo}"))
        .map_err(|e| e.to_string())
}
