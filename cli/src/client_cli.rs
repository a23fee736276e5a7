use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("failed to write image: {0}")]
    Output(std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Pending,
    Completed,
    Failed,
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

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub url: String,
    pub status: JobStatus,
    pub screenshot_url: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Where a bounded polling run ended up. `NotReady` is a client-side
/// timeout: the job may still finish server-side, we just stop watching.
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    Failed,
    NotReady,
}

pub struct ApiClient {
    client: Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        Self {
            client: Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn submit(
        &self,
        url: &str,
        webhook_url: Option<&str>,
    ) -> Result<SubmitResponse, ClientError> {
        let body = serde_json::json!({ "url": url, "webhook_url": webhook_url });
        let response = self
            .client
            .post(format!("{}/screenshots", self.base))
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn status(&self, job_id: Uuid) -> Result<StatusResponse, ClientError> {
        let response = self
            .client
            .get(format!("{}/screenshots/{}/status", self.base, job_id))
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn result(&self, job_id: Uuid) -> Result<JobRecord, ClientError> {
        let response = self
            .client
            .get(format!("{}/screenshots/{}", self.base, job_id))
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn fetch_image(&self, job_id: Uuid) -> Result<Vec<u8>, ClientError> {
        let response = self
            .client
            .get(format!("{}/screenshots/{}/image", self.base, job_id))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::server_error(response).await)
        }
    }

    async fn server_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => "unknown error".to_string(),
        };
        ClientError::Server { status, message }
    }
}

/// Poll a job's status on a fixed interval until it reaches a terminal state
/// or the attempt budget runs out.
///
/// A poll that fails at the transport level consumes its slot but is
/// otherwise skipped; it never ends the run early.
pub async fn poll_until_done(
    client: &ApiClient,
    job_id: Uuid,
    attempts: u32,
    interval: Duration,
) -> PollOutcome {
    for attempt in 1..=attempts {
        tokio::time::sleep(interval).await;
        let status = match client.status(job_id).await {
            Ok(response) => response.status,
            Err(err) => {
                eprintln!("status check failed on attempt {attempt}: {err}");
                continue;
            }
        };
        println!("attempt {attempt}: {status}");
        match status {
            JobStatus::Completed => return PollOutcome::Completed,
            JobStatus::Failed => return PollOutcome::Failed,
            JobStatus::Queued | JobStatus::Pending => {}
        }
    }
    PollOutcome::NotReady
}
