pub mod config;
pub mod models;
pub mod payload;
pub mod status;

pub use config::Config;
pub use models::{JobOutcome, JobRecord, RunMetadata, Verdict};
pub use payload::{Notification, WebhookPayload, build_payload};
pub use status::reduce;
