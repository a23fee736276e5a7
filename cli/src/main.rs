mod arg_parser;
mod client_cli;

use arg_parser::{ArgParser, SubCommand};
use clap::Parser;
use client_cli::{ApiClient, ClientError, PollOutcome};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use uuid::Uuid;

// exit codes: 0 success, 1 job failed, 2 submit failed, 3 not ready in time
#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let args = ArgParser::parse();
    let client = ApiClient::new(&args.server);

    match args.sub_command {
        SubCommand::Capture {
            url,
            webhook_url,
            output,
            attempts,
            interval_secs,
        } => {
            capture(
                &client,
                &url,
                webhook_url.as_deref(),
                output,
                attempts,
                Duration::from_secs(interval_secs),
            )
            .await;
        }
        SubCommand::Submit { url, webhook_url } => {
            let submitted = client.submit(&url, webhook_url.as_deref()).await?;
            println!("job id: {}", submitted.job_id);
            println!("status: {}", submitted.status);
        }
        SubCommand::Status { job_id } => {
            let response = client.status(job_id).await?;
            println!("{}", response.status);
        }
        SubCommand::Result { job_id } => {
            let record = client.result(job_id).await?;
            println!("job id:  {}", record.job_id);
            println!("url:     {}", record.url);
            println!("status:  {}", record.status);
            if let Some(screenshot_url) = record.screenshot_url {
                println!("image:   {screenshot_url}");
            }
            if let Some(reason) = record.failure_reason {
                println!("reason:  {reason}");
            }
        }
        SubCommand::Fetch { job_id, output } => {
            download(&client, job_id, output).await?;
        }
    }

    Ok(())
}

/// The reference flow: submit, poll on a fixed interval with a bounded
/// attempt budget, download the image once on completion.
async fn capture(
    client: &ApiClient,
    url: &str,
    webhook_url: Option<&str>,
    output: Option<PathBuf>,
    attempts: u32,
    interval: Duration,
) {
    // a failed submit aborts this job; there is no submit retry
    let submitted = match client.submit(url, webhook_url).await {
        Ok(submitted) => submitted,
        Err(err) => {
            eprintln!("failed to submit {url}: {err}");
            process::exit(2);
        }
    };
    println!("submitted {url} -> job id {}", submitted.job_id);

    match client_cli::poll_until_done(client, submitted.job_id, attempts, interval).await {
        PollOutcome::Completed => match download(client, submitted.job_id, output).await {
            Ok(path) => println!("screenshot saved as {}", path.display()),
            Err(err) => {
                eprintln!("failed to download screenshot: {err}");
                process::exit(1);
            }
        },
        PollOutcome::Failed => {
            eprintln!("screenshot job failed");
            process::exit(1);
        }
        PollOutcome::NotReady => {
            eprintln!(
                "screenshot not ready after {attempts} attempts; \
                 the job may still finish server-side"
            );
            process::exit(3);
        }
    }
}

async fn download(
    client: &ApiClient,
    job_id: Uuid,
    output: Option<PathBuf>,
) -> Result<PathBuf, ClientError> {
    let bytes = client.fetch_image(job_id).await?;
    let path = output.unwrap_or_else(|| PathBuf::from(format!("{job_id}.png")));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(ClientError::Output)?;
    Ok(path)
}
