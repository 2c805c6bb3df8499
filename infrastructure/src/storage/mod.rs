//! Artifact store adapters
//!
//! - [`FilesystemArtifactStore`] — writes artifacts under a local directory
//! - `S3ArtifactStore` — uploads to an S3 bucket (feature `s3`)

mod filesystem;
#[cfg(feature = "s3")]
mod s3;

pub use filesystem::FilesystemArtifactStore;
#[cfg(feature = "s3")]
pub use s3::S3ArtifactStore;
