mod actor;
pub(crate) mod messages;

use self::actor::JobCoordinator;
use self::messages::CoordinatorMessage::{
    GetArtifactPath, GetResult, GetStatus, ListJobs, Submit,
};
use crate::errors::{self, JobError};
use crate::job::{JobSnapshot, JobStatus};
use crate::notifier::Notifier;
use crate::renderer::Renderer;
use crate::types::{ImageBytes, JobId};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Runtime knobs for the coordinator and its workers.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Directory artifacts are written into, one `<job id>.png` per job.
    pub artifact_dir: PathBuf,
    /// Upper bound on renderer invocations running at once.
    pub max_concurrent_renders: usize,
    /// Hard bound on one render, page load and settle delay included.
    pub render_timeout: Duration,
    /// Capacity of the coordinator's message queue. Limits the build-up of
    /// inbound messages.
    pub message_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("screenshots"),
            max_concurrent_renders: 4,
            render_timeout: Duration::from_secs(30),
            message_capacity: 64,
        }
    }
}

/// A `JobCoordinator` which owns the screenshot job table and drives every
/// job from `queued` to a terminal state.
///
/// This struct is actually an actor handle, the real work is done in the
/// actor spawned by `JobCoordinator::spawn`. The actor-handle split lets this
/// struct be cloned freely in a multi-thread async context without an
/// `Arc<Mutex>` around the job table: all mutation happens on the actor loop,
/// so readers always see whole records.
#[derive(Clone)]
pub struct JobCoordinatorHandle {
    sender: mpsc::Sender<messages::CoordinatorMessage>,
}

impl JobCoordinatorHandle {
    /// Spawn a new coordinator around the given renderer and notifier.
    pub fn spawn(config: CoordinatorConfig, renderer: Arc<dyn Renderer>, notifier: Notifier) -> Self {
        let (sender, receiver) = mpsc::channel(config.message_capacity);
        JobCoordinator::spawn(receiver, sender.clone(), config, renderer, notifier);
        Self { sender }
    }

    /// Create a job in `queued` and schedule its render. Returns as soon as
    /// the record is persisted; the render itself runs on a worker task.
    pub async fn submit(
        &self,
        url: String,
        webhook_url: Option<String>,
    ) -> errors::Result<JobId> {
        let (tx, rx) = oneshot::channel();
        let msg = Submit {
            url,
            webhook_url,
            response: tx,
        };
        self.sender.send(msg).await.expect("JobCoordinator exited");
        rx.await.expect("JobCoordinator exited")
    }

    pub async fn get_status(&self, job_id: JobId) -> errors::Result<JobStatus> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(GetStatus {
                job_id,
                response: tx,
            })
            .await
            .expect("JobCoordinator exited");
        rx.await.expect("JobCoordinator exited")
    }

    /// Full snapshot of a finished job. `NotReady` while the job is still
    /// `queued` or `pending`; failed jobs yield a snapshot too, since the
    /// status field already tells the story.
    pub async fn get_result(&self, job_id: JobId) -> errors::Result<JobSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(GetResult {
                job_id,
                response: tx,
            })
            .await
            .expect("JobCoordinator exited");
        rx.await.expect("JobCoordinator exited")
    }

    /// Read a completed job's image bytes. `NotFound` unless the job exists,
    /// completed, and its artifact file is readable.
    pub async fn get_artifact(&self, job_id: JobId) -> errors::Result<ImageBytes> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(GetArtifactPath {
                job_id,
                response: tx,
            })
            .await
            .expect("JobCoordinator exited");
        let path = rx.await.expect("JobCoordinator exited")?;
        // the file read stays off the actor loop
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(ImageBytes::from(bytes)),
            Err(_) => Err(JobError::NotFound),
        }
    }

    /// Snapshots of every job, most recently created first.
    pub async fn list_jobs(&self) -> Vec<JobSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ListJobs { response: tx })
            .await
            .expect("JobCoordinator exited");
        rx.await.expect("JobCoordinator exited")
    }
}
