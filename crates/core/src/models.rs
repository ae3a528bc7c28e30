use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const GITHUB_URL: &str = "https://github.com";

/// Aggregate outcome of a workflow run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum Verdict {
    Success,
    Failure,
    Cancelled,
}

impl Verdict {
    pub const fn variants() -> &'static [Self] { &[Self::Success, Self::Failure, Self::Cancelled] }

    /// The name substituted for `{{STATUS}}` in templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failure => "Failure",
            Self::Cancelled => "Cancelled",
        }
    }

    /// The name prefixed with its icon glyph.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "✅ Success",
            Self::Failure => "⛔ Failure",
            Self::Cancelled => "❓ Cancelled",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Lifecycle state of a job, as reported by the Actions API.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Waiting => "waiting",
            Self::Requested => "requested",
            Self::Pending => "pending",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for JobStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "waiting" => Self::Waiting,
            "requested" => Self::Requested,
            "pending" => Self::Pending,
            other => Self::Other(other.to_string()),
        })
    }
}

/// Terminal state of a completed job.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum JobConclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    Neutral,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    Other(String),
}

impl JobConclusion {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::Neutral => "neutral",
            Self::TimedOut => "timed_out",
            Self::ActionRequired => "action_required",
            Self::Stale => "stale",
            Self::StartupFailure => "startup_failure",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for JobConclusion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            "skipped" => Self::Skipped,
            "neutral" => Self::Neutral,
            "timed_out" => Self::TimedOut,
            "action_required" => Self::ActionRequired,
            "stale" => Self::Stale,
            "startup_failure" => Self::StartupFailure,
            other => Self::Other(other.to_string()),
        })
    }
}

macro_rules! impl_wire_string {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                let Ok(value) = s.parse::<Self>();
                Ok(value)
            }
        }
    };
}

impl_wire_string!(JobStatus);
impl_wire_string!(JobConclusion);

/// A job as returned by the "list jobs for a workflow run" endpoint.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub conclusion: Option<JobConclusion>,
    pub html_url: String,
}

/// A completed job's name, final state, and a link to its log.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct JobOutcome {
    pub name: String,
    pub status: Option<JobConclusion>,
    pub url: String,
}

impl JobOutcome {
    pub fn new(name: impl Into<String>, status: JobConclusion, url: impl Into<String>) -> Self {
        Self { name: name.into(), status: Some(status), url: url.into() }
    }

    pub fn has_status(&self, conclusion: &JobConclusion) -> bool {
        self.status.as_ref() == Some(conclusion)
    }
}

impl From<JobRecord> for JobOutcome {
    fn from(record: JobRecord) -> Self {
        Self { name: record.name, status: record.conclusion, url: record.html_url }
    }
}

/// Keep only completed jobs, preserving order.
pub fn completed_outcomes(records: impl IntoIterator<Item = JobRecord>) -> Vec<JobOutcome> {
    records
        .into_iter()
        .filter(|record| record.status == JobStatus::Completed)
        .map(JobOutcome::from)
        .collect()
}

/// Identifies the workflow run being reported on.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RunMetadata {
    pub owner: String,
    pub repo: String,
    pub workflow: String,
    pub run_id: u64,
}

impl RunMetadata {
    pub fn full_name(&self) -> String { format!("{}/{}", self.owner, self.repo) }

    pub fn repo_url(&self) -> String { format!("{GITHUB_URL}/{}/{}", self.owner, self.repo) }

    pub fn owner_avatar_url(&self) -> String { format!("{GITHUB_URL}/{}.png", self.owner) }

    pub fn run_url(&self) -> String {
        format!("{GITHUB_URL}/{}/{}/actions/runs/{}", self.owner, self.repo, self.run_id)
    }
}
