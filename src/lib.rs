// Library module for hashmill
// Concurrent file-hashing engine with a polling-based progress API

pub mod digest;
pub mod engine;
pub mod error;

// Re-export commonly used types for convenience
pub use digest::{AlgorithmInfo, DigestRegistry, DigestStream};
pub use engine::{HashEngine, JobHandle, JobSnapshot, JobStatus, SessionStats};
pub use error::EngineError;
