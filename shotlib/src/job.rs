use crate::types::JobId;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobStatus::Queued => "queued",
            JobStatus::Pending => "pending",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        })
    }
}

/// One screenshot job. Owned by the coordinator actor; everyone else
/// reads via [`JobSnapshot`] copies.
#[derive(Clone, Debug)]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub webhook_url: Option<String>,
    pub status: JobStatus,
    pub artifact_path: Option<PathBuf>,
    pub created_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
    pub failure_reason: Option<String>,
}

impl Job {
    pub fn new(id: JobId, url: String, webhook_url: Option<String>) -> Self {
        Self {
            id,
            url,
            webhook_url,
            status: JobStatus::Queued,
            artifact_path: None,
            created_at: OffsetDateTime::now_utc(),
            completed_at: None,
            failure_reason: None,
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id,
            url: self.url.clone(),
            webhook_url: self.webhook_url.clone(),
            status: self.status,
            artifact_path: self.artifact_path.clone(),
            created_at: self.created_at,
            completed_at: self.completed_at,
            failure_reason: self.failure_reason.clone(),
        }
    }
}

/// An owned, consistent copy of a job record.
#[derive(Clone, Debug, Serialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub url: String,
    pub webhook_url: Option<String>,
    pub status: JobStatus,
    pub artifact_path: Option<PathBuf>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub failure_reason: Option<String>,
}
