mod config;
mod error;
mod handlers;

use clap::Parser;
use config::ServerConfig;
use handlers::AppState;
use shotlib::{ChromeRenderer, CoordinatorConfig, JobCoordinator, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::parse();
    serve(config).await
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(&config.artifact_dir).await?;

    let base_url = config.public_base_url();
    let renderer = Arc::new(ChromeRenderer::new(&config.chrome_bin, &config.window_size));
    let coordinator = JobCoordinator::spawn(
        CoordinatorConfig {
            artifact_dir: config.artifact_dir.clone(),
            max_concurrent_renders: config.max_concurrent_renders,
            render_timeout: Duration::from_secs(config.render_timeout_secs),
            ..CoordinatorConfig::default()
        },
        renderer,
        Notifier::new(Some(base_url.clone())),
    );

    let app = handlers::router(AppState {
        coordinator,
        base_url,
    });
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shotlib::{RenderError, Renderer};
    use std::path::Path;
    use tempfile::TempDir;

    const PNG_STUB: &[u8] = b"\x89PNG\r\n\x1a\nstub image bytes";

    struct OkRenderer;

    #[async_trait]
    impl Renderer for OkRenderer {
        async fn render(&self, _url: &str, output: &Path) -> Result<(), RenderError> {
            tokio::fs::write(output, PNG_STUB).await?;
            Ok(())
        }
    }

    struct FailRenderer;

    #[async_trait]
    impl Renderer for FailRenderer {
        async fn render(&self, _url: &str, _output: &Path) -> Result<(), RenderError> {
            Err(RenderError::MissingOutput)
        }
    }

    struct HangRenderer;

    #[async_trait]
    impl Renderer for HangRenderer {
        async fn render(&self, _url: &str, _output: &Path) -> Result<(), RenderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    // spin up the real server on an ephemeral port; returns its base url
    async fn start_server(dir: &TempDir, renderer: Arc<dyn Renderer>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{addr}");

        let coordinator = JobCoordinator::spawn(
            CoordinatorConfig {
                artifact_dir: dir.path().to_path_buf(),
                render_timeout: Duration::from_secs(5),
                ..CoordinatorConfig::default()
            },
            renderer,
            Notifier::new(Some(base_url.clone())),
        );
        let app = handlers::router(AppState {
            coordinator,
            base_url: base_url.clone(),
        });
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server exited");
        });
        base_url
    }

    async fn poll_status(client: &reqwest::Client, base: &str, job_id: &str) -> String {
        for _ in 0..500 {
            let body: serde_json::Value = client
                .get(format!("{base}/screenshots/{job_id}/status"))
                .send()
                .await
                .expect("status request")
                .json()
                .await
                .expect("status body");
            let status = body["status"].as_str().expect("status field").to_string();
            if status == "completed" || status == "failed" {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job never reached a terminal state");
    }

    #[tokio::test]
    async fn submit_poll_fetch_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        let base = start_server(&dir, Arc::new(OkRenderer)).await;
        let client = reqwest::Client::new();

        let body: serde_json::Value = client
            .post(format!("{base}/screenshots"))
            .json(&serde_json::json!({ "url": "https://example.com" }))
            .send()
            .await
            .expect("submit request")
            .json()
            .await
            .expect("submit body");
        assert_eq!(body["status"], "queued");
        let job_id = body["job_id"].as_str().expect("job id").to_string();

        assert_eq!(poll_status(&client, &base, &job_id).await, "completed");

        let result: serde_json::Value = client
            .get(format!("{base}/screenshots/{job_id}"))
            .send()
            .await
            .expect("result request")
            .json()
            .await
            .expect("result body");
        assert_eq!(result["status"], "completed");
        let screenshot_url = result["screenshot_url"].as_str().expect("screenshot url");
        assert_eq!(
            screenshot_url,
            format!("{base}/screenshots/{job_id}/image")
        );

        let image = client
            .get(screenshot_url)
            .send()
            .await
            .expect("image request");
        assert_eq!(image.status(), reqwest::StatusCode::OK);
        assert_eq!(
            image.headers()[reqwest::header::CONTENT_TYPE],
            "image/png"
        );
        let bytes = image.bytes().await.expect("image bytes");
        assert_eq!(&bytes[..], PNG_STUB);

        let jobs: serde_json::Value = client
            .get(format!("{base}/admin/jobs"))
            .send()
            .await
            .expect("list request")
            .json()
            .await
            .expect("list body");
        let jobs = jobs.as_array().expect("job array");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0]["job_id"].as_str(), Some(job_id.as_str()));
    }

    #[tokio::test]
    async fn missing_or_empty_url_is_a_bad_request() {
        let dir = TempDir::new().expect("tempdir");
        let base = start_server(&dir, Arc::new(OkRenderer)).await;
        let client = reqwest::Client::new();

        for body in [serde_json::json!({}), serde_json::json!({ "url": "" })] {
            let response = client
                .post(format!("{base}/screenshots"))
                .json(&body)
                .send()
                .await
                .expect("submit request");
            assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let base = start_server(&dir, Arc::new(OkRenderer)).await;
        let client = reqwest::Client::new();
        let bogus = uuid::Uuid::new_v4();

        for path in [
            format!("/screenshots/{bogus}/status"),
            format!("/screenshots/{bogus}"),
            format!("/screenshots/{bogus}/image"),
        ] {
            let response = client
                .get(format!("{base}{path}"))
                .send()
                .await
                .expect("request");
            assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn unfinished_job_result_is_a_conflict() {
        let dir = TempDir::new().expect("tempdir");
        let base = start_server(&dir, Arc::new(HangRenderer)).await;
        let client = reqwest::Client::new();

        let body: serde_json::Value = client
            .post(format!("{base}/screenshots"))
            .json(&serde_json::json!({ "url": "https://example.com" }))
            .send()
            .await
            .expect("submit request")
            .json()
            .await
            .expect("submit body");
        let job_id = body["job_id"].as_str().expect("job id");

        let result = client
            .get(format!("{base}/screenshots/{job_id}"))
            .send()
            .await
            .expect("result request");
        assert_eq!(result.status(), reqwest::StatusCode::CONFLICT);

        let image = client
            .get(format!("{base}/screenshots/{job_id}/image"))
            .send()
            .await
            .expect("image request");
        assert_eq!(image.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn failed_job_reports_reason_and_has_no_image() {
        let dir = TempDir::new().expect("tempdir");
        let base = start_server(&dir, Arc::new(FailRenderer)).await;
        let client = reqwest::Client::new();

        let body: serde_json::Value = client
            .post(format!("{base}/screenshots"))
            .json(&serde_json::json!({ "url": "https://example.com" }))
            .send()
            .await
            .expect("submit request")
            .json()
            .await
            .expect("submit body");
        let job_id = body["job_id"].as_str().expect("job id").to_string();

        assert_eq!(poll_status(&client, &base, &job_id).await, "failed");

        let result: serde_json::Value = client
            .get(format!("{base}/screenshots/{job_id}"))
            .send()
            .await
            .expect("result request")
            .json()
            .await
            .expect("result body");
        assert_eq!(result["status"], "failed");
        assert!(result["failure_reason"].as_str().is_some());
        assert!(result["screenshot_url"].is_null());

        let image = client
            .get(format!("{base}/screenshots/{job_id}/image"))
            .send()
            .await
            .expect("image request");
        assert_eq!(image.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
