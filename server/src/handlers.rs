use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shotlib::types::JobId;
use shotlib::{JobCoordinator, JobSnapshot, JobStatus};
use time::OffsetDateTime;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: JobCoordinator,
    pub base_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/screenshots", post(submit))
        .route("/screenshots/{job_id}", get(result))
        .route("/screenshots/{job_id}/status", get(status))
        .route("/screenshots/{job_id}/image", get(image))
        .route("/admin/jobs", get(list_jobs))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    // a missing url behaves like an empty one: rejected by the coordinator
    #[serde(default)]
    url: String,
    webhook_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    job_id: JobId,
    status: JobStatus,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    job_id: JobId,
    status: JobStatus,
}

/// Job record as presented over the API: the artifact path becomes a URL.
#[derive(Debug, Serialize)]
struct JobView {
    job_id: JobId,
    url: String,
    webhook_url: Option<String>,
    status: JobStatus,
    screenshot_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    completed_at: Option<OffsetDateTime>,
    failure_reason: Option<String>,
}

impl JobView {
    fn from_snapshot(snapshot: JobSnapshot, base_url: &str) -> Self {
        let screenshot_url = (snapshot.status == JobStatus::Completed).then(|| {
            format!(
                "{}/screenshots/{}/image",
                base_url.trim_end_matches('/'),
                snapshot.job_id
            )
        });
        Self {
            job_id: snapshot.job_id,
            url: snapshot.url,
            webhook_url: snapshot.webhook_url,
            status: snapshot.status,
            screenshot_url,
            created_at: snapshot.created_at,
            completed_at: snapshot.completed_at,
            failure_reason: snapshot.failure_reason,
        }
    }
}

async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let job_id = state.coordinator.submit(req.url, req.webhook_url).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id,
            status: JobStatus::Queued,
        }),
    ))
}

async fn status(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.coordinator.get_status(job_id).await?;
    Ok(Json(StatusResponse { job_id, status }))
}

async fn result(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobView>, ApiError> {
    let snapshot = state.coordinator.get_result(job_id).await?;
    Ok(Json(JobView::from_snapshot(snapshot, &state.base_url)))
}

async fn image(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.coordinator.get_artifact(job_id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobView>> {
    let views = state
        .coordinator
        .list_jobs()
        .await
        .into_iter()
        .map(|snapshot| JobView::from_snapshot(snapshot, &state.base_url))
        .collect();
    Json(views)
}

async fn home() -> &'static str {
    "webshot screenshot API\n\
     \n\
     POST /screenshots              submit a render job\n\
     GET  /screenshots/<id>/status  poll job status\n\
     GET  /screenshots/<id>         full job record\n\
     GET  /screenshots/<id>/image   the captured image\n\
     GET  /admin/jobs               all jobs, newest first\n"
}
