// Hash module
// Digest algorithms used to confirm two object bodies are byte-identical

pub mod digest;

pub use digest::{bytes_to_hex, digest_hex, AlgorithmInfo, HashRegistry, Hasher, DEFAULT_ALGORITHM};
