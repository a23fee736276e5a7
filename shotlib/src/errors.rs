use std::result;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobError {
    #[error("url must be non-empty")]
    InvalidRequest,
    #[error("no such job exists")]
    NotFound,
    #[error("job has not finished yet")]
    NotReady,
}

pub type Result<T> = result::Result<T, JobError>;
