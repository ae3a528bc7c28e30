use serde::Serialize;

use crate::{
    config::Config,
    models::{JobOutcome, JobRecord, RunMetadata, Verdict, completed_outcomes},
    status::reduce,
};

/// Placeholder replaced with the verdict name in title and description templates.
pub const STATUS_PLACEHOLDER: &str = "{{STATUS}}";

/// Body of a Discord "execute webhook" request.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub embeds: [Embed; 1],
}

impl WebhookPayload {
    pub fn embed(&self) -> &Embed { &self.embeds[0] }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Embed {
    pub author: EmbedAuthor,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<EmbedField>>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    /// Completed jobs always carry a conclusion, so a missing one is shown as
    /// `unknown` rather than `null`.
    fn for_job(job: &JobOutcome) -> Self {
        let status = job.status.as_ref().map_or("unknown", |s| s.as_str());
        Self { name: job.name.clone(), value: format!("[`{status}`]({})", job.url), inline: true }
    }
}

/// Replace the first `{{STATUS}}` in `template` with the verdict name.
/// Returns `None` if the result is empty.
pub fn render_template(template: &str, verdict: Verdict) -> Option<String> {
    let rendered = template.replacen(STATUS_PLACEHOLDER, verdict.as_str(), 1);
    (!rendered.is_empty()).then_some(rendered)
}

pub fn default_title(run: &RunMetadata, verdict: Verdict) -> String {
    format!("Workflow > [{}]: {}", run.workflow, verdict.label())
}

pub fn build_payload(
    verdict: Verdict,
    jobs: &[JobOutcome],
    run: &RunMetadata,
    config: &Config,
) -> WebhookPayload {
    let message = &config.message;
    let mut embed = Embed {
        author: EmbedAuthor {
            name: run.full_name(),
            url: run.repo_url(),
            icon_url: run.owner_avatar_url(),
        },
        title: render_template(&message.title, verdict)
            .unwrap_or_else(|| default_title(run, verdict)),
        url: run.run_url(),
        description: None,
        color: message.colors.for_verdict(verdict).into(),
        fields: None,
    };
    embed.description = render_template(&message.description, verdict);
    if message.include_details && !jobs.is_empty() {
        embed.fields = Some(jobs.iter().map(EmbedField::for_job).collect());
    }
    WebhookPayload {
        username: config.discord.username.clone(),
        avatar_url: config.discord.avatar_url.clone(),
        embeds: [embed],
    }
}

/// A notification ready to be delivered for one workflow run.
#[derive(Debug, Clone)]
pub struct Notification {
    pub verdict: Verdict,
    pub jobs: Vec<JobOutcome>,
    pub payload: WebhookPayload,
}

impl Notification {
    /// Reduce the completed jobs of a run and build its payload.
    pub fn for_run(records: Vec<JobRecord>, run: &RunMetadata, config: &Config) -> Self {
        let total = records.len();
        let jobs = completed_outcomes(records);
        let verdict = reduce(&jobs);
        tracing::debug!(
            "Run {} has {} completed jobs out of {} (verdict {})",
            run.run_id,
            jobs.len(),
            total,
            verdict
        );
        let payload = build_payload(verdict, &jobs, run, config);
        Self { verdict, jobs, payload }
    }
}
