//! Generation backend adapters
//!
//! Each adapter implements one or more of the application's backend ports.
//! Adapters that talk to remote services sit behind cargo features so the
//! binary builds without their SDKs; [`UnavailableBackend`] stands in for
//! any backend that is compiled out or not configured.

#[cfg(any(feature = "bedrock", feature = "s3"))]
pub mod aws;
#[cfg(feature = "bedrock")]
pub mod bedrock;
mod unavailable;

pub use unavailable::UnavailableBackend;
