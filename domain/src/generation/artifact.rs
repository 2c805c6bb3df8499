//! Persisted artifact handles and storage keys

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of payload stored in the artifact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Image,
    Audio,
}

impl ArtifactKind {
    fn key_prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Image => "generated_image",
            ArtifactKind::Audio => "speech",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Image => "png",
            ArtifactKind::Audio => "mp3",
        }
    }

    /// MIME type written alongside the payload.
    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Image => "image/png",
            ArtifactKind::Audio => "audio/mpeg",
        }
    }
}

/// Storage key for a new artifact (Value Object)
///
/// Keys are derived from the creation timestamp (microsecond precision)
/// plus a short random suffix, so two artifacts created within the same
/// tick still get distinct keys.
///
/// ```
/// use palaver_domain::generation::artifact::{ArtifactKey, ArtifactKind};
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
/// let key = ArtifactKey::with_suffix(ArtifactKind::Image, at, "ab12cd34");
/// assert_eq!(key.as_str(), "generated_image_20240501T123000.000000Z_ab12cd34.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    kind: ArtifactKind,
    key: String,
}

impl ArtifactKey {
    /// Generate a fresh key for an artifact created at `at`.
    pub fn generate(kind: ArtifactKind, at: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self::with_suffix(kind, at, &suffix[..8])
    }

    /// Build a key with an explicit suffix.
    pub fn with_suffix(kind: ArtifactKind, at: DateTime<Utc>, suffix: &str) -> Self {
        let key = format!(
            "{}_{}_{}.{}",
            kind.key_prefix(),
            at.format("%Y%m%dT%H%M%S%.6fZ"),
            suffix,
            kind.extension()
        );
        Self { kind, key }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Handle to a payload persisted in durable storage.
///
/// `location` is whatever the store hands back: a file path, an
/// `s3://bucket/key` URI, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandle {
    pub kind: ArtifactKind,
    pub key: String,
    pub location: String,
    pub content_type: String,
    pub size_bytes: usize,
}
