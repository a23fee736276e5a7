mod actors;
pub mod errors;
mod job;
mod notifier;
mod renderer;
mod store;
pub mod types;

// re-export the coordinator handle as if it is the coordinator itself.
pub use actors::coordinator::{CoordinatorConfig, JobCoordinatorHandle as JobCoordinator};
pub use errors::JobError;
pub use job::{JobSnapshot, JobStatus};
pub use notifier::{Notifier, WebhookPayload};
pub use renderer::{ChromeRenderer, RenderError, Renderer};
pub use store::{JobStore, MemoryStore};
