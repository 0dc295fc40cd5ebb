// Digest module
// Pluggable hash algorithms and the streaming digest used by session workers

pub mod algorithms;
pub mod stream;

pub use algorithms::{AlgorithmInfo, DigestHasher, DigestRegistry};
pub use stream::DigestStream;
