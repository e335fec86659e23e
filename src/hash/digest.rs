// Digest registry
// Incremental hashers selectable by name, used for object content checks

use crate::error::{BucketDiffError, Result};

use blake2::{Blake2b512, Blake2s256};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use sha3::{Sha3_256, Sha3_512};
use xxhash_rust::xxh3::Xxh3;

/// Default algorithm for content checks
pub const DEFAULT_ALGORITHM: &str = "md5";

/// Trait for incremental hash implementations
pub trait Hasher: Send {
    /// Feed the next chunk of data
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the raw digest
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Digest length in bytes
    fn output_size(&self) -> usize;
}

/// Information about a hash algorithm
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub output_bits: usize,
    pub cryptographic: bool,
}

// Every RustCrypto hasher shares the digest 0.10 `Digest` trait
macro_rules! digest_hasher {
    ($wrapper:ident, $inner:ty, $bytes:expr) => {
        pub struct $wrapper($inner);

        impl $wrapper {
            fn boxed() -> Box<dyn Hasher> {
                Box::new($wrapper(<$inner as Digest>::new()))
            }
        }

        impl Hasher for $wrapper {
            fn update(&mut self, data: &[u8]) {
                Digest::update(&mut self.0, data);
            }

            fn finalize(self: Box<Self>) -> Vec<u8> {
                Digest::finalize(self.0).to_vec()
            }

            fn output_size(&self) -> usize {
                $bytes
            }
        }
    };
}

digest_hasher!(Md5Hasher, Md5, 16);
digest_hasher!(Sha1Hasher, Sha1, 20);
digest_hasher!(Sha256Hasher, Sha256, 32);
digest_hasher!(Sha384Hasher, Sha384, 48);
digest_hasher!(Sha512Hasher, Sha512, 64);
digest_hasher!(Sha3_256Hasher, Sha3_256, 32);
digest_hasher!(Sha3_512Hasher, Sha3_512, 64);
digest_hasher!(Blake2bHasher, Blake2b512, 64);
digest_hasher!(Blake2sHasher, Blake2s256, 32);

pub struct Blake3Hasher(blake3::Hasher);

impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }
}

/// XXH3, 64 or 128 bit output
pub struct Xxh3Hasher {
    state: Xxh3,
    wide: bool,
}

impl Hasher for Xxh3Hasher {
    fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        if self.wide {
            self.state.digest128().to_be_bytes().to_vec()
        } else {
            self.state.digest().to_be_bytes().to_vec()
        }
    }

    fn output_size(&self) -> usize {
        if self.wide {
            16
        } else {
            8
        }
    }
}

/// Registry for hash algorithms
pub struct HashRegistry;

impl HashRegistry {
    /// Get a fresh hasher for the named algorithm (case-insensitive)
    pub fn get_hasher(algorithm: &str) -> Result<Box<dyn Hasher>> {
        match Self::canonical_name(algorithm)? {
            "md5" => Ok(Md5Hasher::boxed()),
            "sha1" => Ok(Sha1Hasher::boxed()),
            "sha256" => Ok(Sha256Hasher::boxed()),
            "sha384" => Ok(Sha384Hasher::boxed()),
            "sha512" => Ok(Sha512Hasher::boxed()),
            "sha3-256" => Ok(Sha3_256Hasher::boxed()),
            "sha3-512" => Ok(Sha3_512Hasher::boxed()),
            "blake2b" => Ok(Blake2bHasher::boxed()),
            "blake2s" => Ok(Blake2sHasher::boxed()),
            "blake3" => Ok(Box::new(Blake3Hasher(blake3::Hasher::new()))),
            "xxh3" => Ok(Box::new(Xxh3Hasher { state: Xxh3::new(), wide: false })),
            "xxh128" => Ok(Box::new(Xxh3Hasher { state: Xxh3::new(), wide: true })),
            other => Err(BucketDiffError::UnsupportedAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }

    /// Normalize aliases such as `SHA-256` to the registry name
    pub fn canonical_name(algorithm: &str) -> Result<&'static str> {
        let name = match algorithm.to_lowercase().as_str() {
            "md5" => "md5",
            "sha1" | "sha-1" => "sha1",
            "sha256" | "sha-256" => "sha256",
            "sha384" | "sha-384" => "sha384",
            "sha512" | "sha-512" => "sha512",
            "sha3-256" => "sha3-256",
            "sha3-512" => "sha3-512",
            "blake2b" | "blake2b-512" => "blake2b",
            "blake2s" | "blake2s-256" => "blake2s",
            "blake3" => "blake3",
            "xxh3" => "xxh3",
            "xxh128" => "xxh128",
            _ => {
                return Err(BucketDiffError::UnsupportedAlgorithm {
                    algorithm: algorithm.to_string(),
                })
            }
        };
        Ok(name)
    }

    /// List all available algorithms
    pub fn list_algorithms() -> Vec<AlgorithmInfo> {
        [
            ("md5", 128, true),
            ("sha1", 160, true),
            ("sha256", 256, true),
            ("sha384", 384, true),
            ("sha512", 512, true),
            ("sha3-256", 256, true),
            ("sha3-512", 512, true),
            ("blake2b", 512, true),
            ("blake2s", 256, true),
            ("blake3", 256, true),
            ("xxh3", 64, false),
            ("xxh128", 128, false),
        ]
        .into_iter()
        .map(|(name, output_bits, cryptographic)| AlgorithmInfo {
            name,
            output_bits,
            cryptographic,
        })
        .collect()
    }
}

/// Convert bytes to a lowercase hex string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash an in-memory buffer in one call
pub fn digest_hex(algorithm: &str, data: &[u8]) -> Result<String> {
    let mut hasher = HashRegistry::get_hasher(algorithm)?;
    hasher.update(data);
    Ok(bytes_to_hex(&hasher.finalize()))
}
