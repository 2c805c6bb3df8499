//! Durable artifact store port
//!
//! Generated images and synthesized speech are persisted under unique keys.
//! The store is append-only: keys are generated collision-safe, so no
//! locking is required between sessions.

use async_trait::async_trait;
use palaver_domain::{ArtifactHandle, ArtifactKey};
use thiserror::Error;

/// Errors from artifact storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("store rejected the object: {0}")]
    Rejected(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `payload` under `key`, returning a handle to it.
    async fn put(
        &self,
        key: &ArtifactKey,
        payload: &[u8],
        content_type: &str,
    ) -> Result<ArtifactHandle, StoreError>;
}
