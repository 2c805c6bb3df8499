//! Generation domain: what callers ask for and what they get back.
//!
//! - [`request::GenerationRequest`] — tagged union over the four modalities
//! - [`result::GenerationResult`] — mirrors the request kind, success or failure
//! - [`failure::GenerationFailure`] — caller-facing failure taxonomy
//! - [`failure::BackendError`] — failure tag returned by adapters
//! - [`artifact::ArtifactHandle`] — handle to a persisted image or audio payload
//! - [`config`] — per-modality generation settings

pub mod artifact;
pub mod config;
pub mod failure;
pub mod request;
pub mod result;
