use crate::job::{JobSnapshot, JobStatus};
use crate::types::JobId;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// One-shot webhook payload carrying a job's final outcome.
#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Best-effort webhook delivery. One attempt per job, short timeout, and
/// every delivery error is swallowed: a dead webhook never touches job state.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    base_url: Option<String>,
    delivery_timeout: Duration,
}

impl Notifier {
    pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            delivery_timeout: Self::DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub async fn notify(&self, webhook_url: &str, snapshot: &JobSnapshot) {
        let payload = WebhookPayload {
            job_id: snapshot.job_id,
            status: snapshot.status,
            artifact_url: self.artifact_url(snapshot),
            failure_reason: snapshot.failure_reason.clone(),
        };
        let result = self
            .client
            .post(webhook_url)
            .timeout(self.delivery_timeout)
            .json(&payload)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                debug!(job_id = %snapshot.job_id, webhook_url, "webhook delivered");
            }
            Ok(response) => {
                warn!(
                    job_id = %snapshot.job_id,
                    webhook_url,
                    status = %response.status(),
                    "webhook rejected"
                );
            }
            Err(err) => {
                warn!(job_id = %snapshot.job_id, webhook_url, %err, "webhook delivery failed");
            }
        }
    }

    fn artifact_url(&self, snapshot: &JobSnapshot) -> Option<String> {
        if snapshot.status != JobStatus::Completed {
            return None;
        }
        self.base_url.as_ref().map(|base| {
            format!(
                "{}/screenshots/{}/image",
                base.trim_end_matches('/'),
                snapshot.job_id
            )
        })
    }
}
