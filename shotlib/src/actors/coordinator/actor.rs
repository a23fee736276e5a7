use super::messages::CoordinatorMessage;
use super::CoordinatorConfig;
use crate::actors::worker;
use crate::errors::{self, JobError};
use crate::job::{Job, JobSnapshot, JobStatus};
use crate::notifier::Notifier;
use crate::renderer::Renderer;
use crate::store::{JobStore, MemoryStore};
use crate::types::JobId;
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

pub struct JobCoordinator {
    inbox: mpsc::Receiver<CoordinatorMessage>,
    // handed to workers so their events land in the same inbox
    worker_tx: mpsc::Sender<CoordinatorMessage>,
    config: CoordinatorConfig,
    renderer: Arc<dyn Renderer>,
    notifier: Notifier,
    render_slots: Arc<Semaphore>,
    store: Box<dyn JobStore>,
}

impl JobCoordinator {
    pub fn spawn(
        inbox: mpsc::Receiver<CoordinatorMessage>,
        worker_tx: mpsc::Sender<CoordinatorMessage>,
        config: CoordinatorConfig,
        renderer: Arc<dyn Renderer>,
        notifier: Notifier,
    ) {
        let render_slots = Arc::new(Semaphore::new(config.max_concurrent_renders));
        let actor = Self {
            inbox,
            worker_tx,
            config,
            renderer,
            notifier,
            render_slots,
            store: Box::new(MemoryStore::default()),
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        use self::CoordinatorMessage::*;
        while let Some(msg) = self.inbox.recv().await {
            match msg {
                Submit {
                    url,
                    webhook_url,
                    response,
                } => {
                    let _ = response.send(self.submit(url, webhook_url));
                }
                GetStatus { job_id, response } => {
                    let _ = response.send(self.get_status(job_id));
                }
                GetResult { job_id, response } => {
                    let _ = response.send(self.get_result(job_id));
                }
                GetArtifactPath { job_id, response } => {
                    let _ = response.send(self.get_artifact_path(job_id));
                }
                ListJobs { response } => {
                    let _ = response.send(self.store.snapshots());
                }
                Started { job_id } => self.mark_started(job_id),
                Finished { job_id, outcome } => self.mark_finished(job_id, outcome),
            }
        }
    }

    fn submit(&mut self, url: String, webhook_url: Option<String>) -> errors::Result<JobId> {
        if url.trim().is_empty() {
            return Err(JobError::InvalidRequest);
        }
        let job_id = JobId::new_v4();
        self.store.insert(Job::new(job_id, url.clone(), webhook_url));

        // output location is a pure function of the job id
        let output = self.config.artifact_dir.join(format!("{job_id}.png"));
        worker::spawn(
            job_id,
            url,
            output,
            Arc::clone(&self.renderer),
            self.config.render_timeout,
            Arc::clone(&self.render_slots),
            self.worker_tx.clone(),
        );
        info!(%job_id, "job submitted");
        Ok(job_id)
    }

    fn get_status(&self, job_id: JobId) -> errors::Result<JobStatus> {
        self.store
            .get(job_id)
            .map(|job| job.status)
            .ok_or(JobError::NotFound)
    }

    fn get_result(&self, job_id: JobId) -> errors::Result<JobSnapshot> {
        let job = self.store.get(job_id).ok_or(JobError::NotFound)?;
        match job.status {
            JobStatus::Queued | JobStatus::Pending => Err(JobError::NotReady),
            JobStatus::Completed | JobStatus::Failed => Ok(job.snapshot()),
        }
    }

    fn get_artifact_path(&self, job_id: JobId) -> errors::Result<PathBuf> {
        let job = self.store.get(job_id).ok_or(JobError::NotFound)?;
        match (job.status, &job.artifact_path) {
            (JobStatus::Completed, Some(path)) => Ok(path.clone()),
            _ => Err(JobError::NotFound),
        }
    }

    fn mark_started(&mut self, job_id: JobId) {
        match self.store.get_mut(job_id) {
            Some(job) if job.status == JobStatus::Queued => {
                job.status = JobStatus::Pending;
                debug!(%job_id, "render started");
            }
            Some(job) => {
                debug!(%job_id, status = %job.status, "ignoring stale start event");
            }
            None => {
                debug!(%job_id, "start event for unknown job");
            }
        }
    }

    fn mark_finished(&mut self, job_id: JobId, outcome: Result<PathBuf, String>) {
        let Some(job) = self.store.get_mut(job_id) else {
            debug!(%job_id, "finish event for unknown job");
            return;
        };
        if job.status.is_terminal() {
            debug!(%job_id, status = %job.status, "ignoring finish event for terminal job");
            return;
        }
        match outcome {
            Ok(path) => {
                job.status = JobStatus::Completed;
                job.artifact_path = Some(path);
                job.completed_at = Some(OffsetDateTime::now_utc());
                info!(%job_id, "job completed");
            }
            Err(reason) => {
                warn!(%job_id, %reason, "job failed");
                job.status = JobStatus::Failed;
                job.failure_reason = Some(reason);
            }
        }

        let snapshot = job.snapshot();
        if let Some(webhook_url) = snapshot.webhook_url.clone() {
            let notifier = self.notifier.clone();
            // fire and forget, exactly once; delivery problems never touch
            // the job record
            tokio::spawn(async move { notifier.notify(&webhook_url, &snapshot).await });
        }
    }
}
