// Streaming digest
// Incremental hashing with a running byte count

use super::algorithms::{DigestHasher, DigestRegistry};
use crate::error::EngineError;

/// Wraps a hash algorithm and consumes a byte stream incrementally,
/// tracking how many bytes have been fed so far.
pub struct DigestStream {
    hasher: Box<dyn DigestHasher>,
    bytes_consumed: u64,
}

impl DigestStream {
    /// Create a stream for the named algorithm
    pub fn new(algorithm: &str) -> Result<Self, EngineError> {
        Ok(Self {
            hasher: DigestRegistry::hasher_for(algorithm)?,
            bytes_consumed: 0,
        })
    }

    /// Feed one chunk of input
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes_consumed += chunk.len() as u64;
    }

    /// Total bytes consumed so far
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Digest output size in bytes
    pub fn output_size(&self) -> usize {
        self.hasher.output_size()
    }

    /// Finalize and return the digest as a lowercase hex string
    pub fn finalize_hex(self) -> String {
        bytes_to_hex(&self.hasher.finalize())
    }
}

/// Convert bytes to hexadecimal string
fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
