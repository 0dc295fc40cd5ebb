// Hash algorithm registry
// Maps algorithm names to boxed streaming hashers

use crate::error::EngineError;

use blake2::{Blake2b512, Blake2s256};
use blake3::Hasher as Blake3Inner;
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

/// Trait for streaming hash algorithm implementations.
pub trait DigestHasher: Send {
    /// Update the hasher with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the raw digest bytes
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Output size in bytes
    fn output_size(&self) -> usize;
}

// The RustCrypto hashers all share the Digest trait, so one wrapper
// definition covers the whole family.
macro_rules! rust_crypto_hasher {
    ($wrapper:ident, $inner:ty, $output_bytes:expr) => {
        struct $wrapper($inner);

        impl DigestHasher for $wrapper {
            fn update(&mut self, data: &[u8]) {
                Digest::update(&mut self.0, data);
            }

            fn finalize(self: Box<Self>) -> Vec<u8> {
                Digest::finalize(self.0).to_vec()
            }

            fn output_size(&self) -> usize {
                $output_bytes
            }
        }
    };
}

rust_crypto_hasher!(Md5Hasher, Md5, 16);
rust_crypto_hasher!(Sha1Hasher, Sha1, 20);
rust_crypto_hasher!(Sha224Hasher, Sha224, 28);
rust_crypto_hasher!(Sha256Hasher, Sha256, 32);
rust_crypto_hasher!(Sha384Hasher, Sha384, 48);
rust_crypto_hasher!(Sha512Hasher, Sha512, 64);
rust_crypto_hasher!(Sha3_224Hasher, Sha3_224, 28);
rust_crypto_hasher!(Sha3_256Hasher, Sha3_256, 32);
rust_crypto_hasher!(Sha3_384Hasher, Sha3_384, 48);
rust_crypto_hasher!(Sha3_512Hasher, Sha3_512, 64);
rust_crypto_hasher!(Blake2b512Hasher, Blake2b512, 64);
rust_crypto_hasher!(Blake2s256Hasher, Blake2s256, 32);

// BLAKE3 has its own API. With the rayon feature enabled, update_rayon
// parallelizes hashing of large chunks across the pool.
struct Blake3Hasher(Blake3Inner);

impl DigestHasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update_rayon(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }
}

/// Information about a hash algorithm
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub output_bits: usize,
}

/// Registry for hash algorithms
pub struct DigestRegistry;

impl DigestRegistry {
    /// Get a hasher instance for the specified algorithm.
    /// Algorithm names are case-insensitive.
    pub fn hasher_for(algorithm: &str) -> Result<Box<dyn DigestHasher>, EngineError> {
        match algorithm.to_lowercase().as_str() {
            "md5" => Ok(Box::new(Md5Hasher(Digest::new()))),
            "sha1" => Ok(Box::new(Sha1Hasher(Digest::new()))),
            "sha224" | "sha-224" => Ok(Box::new(Sha224Hasher(Digest::new()))),
            "sha256" | "sha-256" => Ok(Box::new(Sha256Hasher(Digest::new()))),
            "sha384" | "sha-384" => Ok(Box::new(Sha384Hasher(Digest::new()))),
            "sha512" | "sha-512" => Ok(Box::new(Sha512Hasher(Digest::new()))),
            "sha3-224" => Ok(Box::new(Sha3_224Hasher(Digest::new()))),
            "sha3-256" => Ok(Box::new(Sha3_256Hasher(Digest::new()))),
            "sha3-384" => Ok(Box::new(Sha3_384Hasher(Digest::new()))),
            "sha3-512" => Ok(Box::new(Sha3_512Hasher(Digest::new()))),
            "blake2b" | "blake2b-512" => Ok(Box::new(Blake2b512Hasher(Digest::new()))),
            "blake2s" | "blake2s-256" => Ok(Box::new(Blake2s256Hasher(Digest::new()))),
            "blake3" => Ok(Box::new(Blake3Hasher(Blake3Inner::new()))),
            _ => Err(EngineError::UnsupportedAlgorithm {
                algorithm: algorithm.to_string(),
            }),
        }
    }

    /// Check whether an algorithm name is known without building a hasher
    pub fn is_supported(algorithm: &str) -> bool {
        Self::hasher_for(algorithm).is_ok()
    }

    /// List all available hash algorithms
    pub fn list_algorithms() -> Vec<AlgorithmInfo> {
        vec![
            AlgorithmInfo { name: "md5", output_bits: 128 },
            AlgorithmInfo { name: "sha1", output_bits: 160 },
            AlgorithmInfo { name: "sha224", output_bits: 224 },
            AlgorithmInfo { name: "sha256", output_bits: 256 },
            AlgorithmInfo { name: "sha384", output_bits: 384 },
            AlgorithmInfo { name: "sha512", output_bits: 512 },
            AlgorithmInfo { name: "sha3-224", output_bits: 224 },
            AlgorithmInfo { name: "sha3-256", output_bits: 256 },
            AlgorithmInfo { name: "sha3-384", output_bits: 384 },
            AlgorithmInfo { name: "sha3-512", output_bits: 512 },
            AlgorithmInfo { name: "blake2b-512", output_bits: 512 },
            AlgorithmInfo { name: "blake2s-256", output_bits: 256 },
            AlgorithmInfo { name: "blake3", output_bits: 256 },
        ]
    }
}
