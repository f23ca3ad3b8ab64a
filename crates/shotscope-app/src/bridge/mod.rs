//! Local HTTP bridge exposing the detector over a browser-friendly endpoint

pub mod multipart;
pub mod server;
pub mod types;

pub use server::BridgeServer;
pub use types::{AnalyzeResponse, ErrorResponse};
