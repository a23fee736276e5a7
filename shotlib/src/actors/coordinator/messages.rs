use crate::errors;
use crate::job::{JobSnapshot, JobStatus};
use crate::types::JobId;
use std::path::PathBuf;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum CoordinatorMessage {
    Submit {
        url: String,
        webhook_url: Option<String>,
        response: oneshot::Sender<errors::Result<JobId>>,
    },
    GetStatus {
        job_id: JobId,
        response: oneshot::Sender<errors::Result<JobStatus>>,
    },
    GetResult {
        job_id: JobId,
        response: oneshot::Sender<errors::Result<JobSnapshot>>,
    },
    GetArtifactPath {
        job_id: JobId,
        response: oneshot::Sender<errors::Result<PathBuf>>,
    },
    ListJobs {
        response: oneshot::Sender<Vec<JobSnapshot>>,
    },
    // worker events; they share the inbox so each worker's Started is
    // applied before its Finished
    Started {
        job_id: JobId,
    },
    Finished {
        job_id: JobId,
        outcome: Result<PathBuf, String>,
    },
}
