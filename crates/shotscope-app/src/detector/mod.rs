//! Detection gateway
//!
//! Translates staged audio clips into backend requests and maps responses
//! into the domain model. The [`Detector`] trait is the seam: the workflow
//! never sees HTTP, and tests substitute their own implementations.

pub mod http;
pub mod traits;
pub mod types;
mod wire;

// Re-exports
pub use http::HttpDetector;
pub use traits::Detector;
pub use types::{Detection, ServiceStatus};
