use crate::actors::coordinator::messages::CoordinatorMessage;
use crate::renderer::Renderer;
use crate::types::JobId;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;

/// Run one job on its own task: wait for a render slot, mark the job
/// pending, render under a hard timeout, and report the outcome.
///
/// On timeout the render future is dropped, which kills any child process
/// the renderer marked kill-on-drop.
pub fn spawn(
    job_id: JobId,
    url: String,
    output: PathBuf,
    renderer: Arc<dyn Renderer>,
    render_timeout: Duration,
    render_slots: Arc<Semaphore>,
    events: mpsc::Sender<CoordinatorMessage>,
) {
    tokio::spawn(async move {
        // hold the slot for the whole render so concurrency stays bounded
        let _permit = match render_slots.acquire_owned().await {
            Ok(permit) => permit,
            // semaphore closed: the coordinator is gone
            Err(_) => return,
        };
        if events
            .send(CoordinatorMessage::Started { job_id })
            .await
            .is_err()
        {
            return;
        }
        let result = timeout(render_timeout, renderer.render(&url, &output)).await;
        let outcome = match result {
            Ok(Ok(())) => Ok(output),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err(format!("render timed out after {render_timeout:?}")),
        };
        let _ = events
            .send(CoordinatorMessage::Finished { job_id, outcome })
            .await;
    });
}
