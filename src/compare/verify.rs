// Content verification module
// Streams both bodies of a key through a digest to confirm byte equality

use std::sync::Arc;

use async_trait::async_trait;
use futures::AsyncReadExt;
use tracing::debug;

use super::classify::CompareOptions;
use crate::error::{BucketDiffError, Result, Side};
use crate::hash::{bytes_to_hex, HashRegistry};
use crate::store::ObjectStore;

/// Digests of both bodies of one key
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContentCheck {
    pub algorithm: &'static str,
    pub source_digest: String,
    pub target_digest: String,
}

impl ContentCheck {
    pub fn is_equal(&self) -> bool {
        self.source_digest == self.target_digest
    }
}

/// Something that can settle a key by looking at content
#[async_trait]
pub trait ContentChecker: Send + Sync {
    async fn check(&self, key: &str) -> Result<ContentCheck>;
}

/// Hashes objects from a source and a target store
pub struct ContentVerifier {
    source: Arc<dyn ObjectStore>,
    target: Arc<dyn ObjectStore>,
    algorithm: &'static str,
    chunk_size: usize,
}

impl ContentVerifier {
    /// Fails early if the configured algorithm is unknown
    pub fn new(
        source: Arc<dyn ObjectStore>,
        target: Arc<dyn ObjectStore>,
        options: &CompareOptions,
    ) -> Result<Self> {
        Ok(Self {
            source,
            target,
            algorithm: HashRegistry::canonical_name(&options.digest_algorithm)?,
            chunk_size: options.chunk_size.max(1),
        })
    }

    /// Hash both sides of `key` and report whether the digests agree
    pub async fn verify_equal(&self, key: &str) -> Result<ContentCheck> {
        let source_digest = self.digest_object(self.source.as_ref(), key, Side::Source).await?;
        let target_digest = self.digest_object(self.target.as_ref(), key, Side::Target).await?;

        debug!(key, source = %source_digest, target = %target_digest, "compared digests");

        Ok(ContentCheck {
            algorithm: self.algorithm,
            source_digest,
            target_digest,
        })
    }

    /// Stream one object in `chunk_size` reads through a fresh hasher
    async fn digest_object(&self, store: &dyn ObjectStore, key: &str, side: Side) -> Result<String> {
        let failed = |reason: String| BucketDiffError::Verification {
            key: key.to_string(),
            side,
            reason,
        };

        let mut reader = store.open_object(key).await.map_err(|e| failed(short_reason(e)))?;
        let mut hasher = HashRegistry::get_hasher(self.algorithm)?;
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = reader.read(&mut buffer).await.map_err(|e| failed(e.to_string()))?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(bytes_to_hex(&hasher.finalize()))
    }
}

#[async_trait]
impl ContentChecker for ContentVerifier {
    async fn check(&self, key: &str) -> Result<ContentCheck> {
        self.verify_equal(key).await
    }
}

/// Store errors carry a suggestion line; a per-key failure only needs the cause
fn short_reason(err: BucketDiffError) -> String {
    match err {
        BucketDiffError::StoreAccess { reason, .. } => reason,
        other => other.to_string(),
    }
}
