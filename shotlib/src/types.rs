use uuid::Uuid;

pub type JobId = Uuid;
pub type ImageBytes = bytes::Bytes;
