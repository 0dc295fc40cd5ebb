// Engine module
// Job registry, session scheduler, and the polling progress surface

pub mod engine;
pub mod job;
pub mod registry;
pub mod session;

pub use engine::HashEngine;
pub use job::{JobSnapshot, JobStatus};
pub use registry::JobHandle;
pub use session::SessionStats;
