pub mod coordinator;
pub(crate) mod worker;
