//! Artifact storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors detected while resolving the storage section
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("unknown storage backend '{0}' (expected \"filesystem\" or \"s3\")")]
    UnknownStorageBackend(String),

    #[error("storage backend \"s3\" requires a bucket")]
    MissingBucket,

    #[error("storage directory cannot be empty")]
    EmptyDirectory,
}

/// Where generated artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    Filesystem(PathBuf),
    S3 { bucket: String },
}

/// Raw `[storage]` section.
///
/// # Example
///
/// ```toml
/// [storage]
/// backend = "s3"
/// bucket = "my-artifacts"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// "filesystem" or "s3"
    pub backend: String,
    /// Root directory for the filesystem backend.
    pub directory: PathBuf,
    /// Bucket for the S3 backend.
    pub bucket: Option<String>,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            backend: "filesystem".to_string(),
            directory: PathBuf::from("artifacts"),
            bucket: None,
        }
    }
}

impl FileStorageConfig {
    pub fn target(&self) -> Result<StorageTarget, ConfigValidationError> {
        match self.backend.trim().to_lowercase().as_str() {
            "filesystem" | "fs" => {
                if self.directory.as_os_str().is_empty() {
                    return Err(ConfigValidationError::EmptyDirectory);
                }
                Ok(StorageTarget::Filesystem(self.directory.clone()))
            }
            "s3" => match self.bucket.as_deref().map(str::trim) {
                Some(bucket) if !bucket.is_empty() => Ok(StorageTarget::S3 {
                    bucket: bucket.to_string(),
                }),
                _ => Err(ConfigValidationError::MissingBucket),
            },
            other => Err(ConfigValidationError::UnknownStorageBackend(
                other.to_string(),
            )),
        }
    }
}
