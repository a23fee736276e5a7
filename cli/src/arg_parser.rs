use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Talk to a webshot screenshot server
#[derive(Debug, Parser)]
pub struct ArgParser {
    /// Base URL of the server
    #[clap(
        short = 's',
        long = "server",
        env = "WEBSHOT_SERVER",
        default_value = "http://127.0.0.1:8080"
    )]
    pub server: String,
    /// The sub-command to use
    #[clap(subcommand)]
    pub sub_command: SubCommand,
}

#[derive(Clone, Debug, Subcommand)]
pub enum SubCommand {
    /// submit a job, poll it to completion, and download the image
    Capture {
        /// page to render
        url: String,

        /// optional webhook notified when the job finishes
        #[clap(long)]
        webhook_url: Option<String>,

        /// where to write the downloaded image (default: <job id>.png)
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,

        /// how many status polls before giving up
        #[clap(long, default_value_t = 10)]
        attempts: u32,

        /// seconds between polls
        #[clap(long, default_value_t = 2)]
        interval_secs: u64,
    },
    /// submit a job without waiting for it
    Submit {
        /// page to render
        url: String,

        /// optional webhook notified when the job finishes
        #[clap(long)]
        webhook_url: Option<String>,
    },
    /// get a job's status
    Status {
        /// Uuid v4 string
        job_id: Uuid,
    },
    /// get a finished job's full record
    Result {
        /// Uuid v4 string
        job_id: Uuid,
    },
    /// download a completed job's image
    Fetch {
        /// Uuid v4 string
        job_id: Uuid,

        /// where to write the image (default: <job id>.png)
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,
    },
}
