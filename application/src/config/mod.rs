//! Application-level configuration.
//!
//! - [`DispatchParams`] — per-request limits (timeouts, input length, idle eviction)
//! - [`PalaverConfig`] — container for every setting the use cases consume

pub mod dispatch_params;
pub mod palaver_config;

pub use dispatch_params::DispatchParams;
pub use palaver_config::PalaverConfig;
