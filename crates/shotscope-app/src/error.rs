//! Application error types

use shotscope::error::ClipError;
use thiserror::Error;

/// Turn a reqwest error into something a person can act on
fn friendly_network_error(e: &reqwest::Error) -> String {
    if e.is_builder() {
        if let Some(url) = e.url() {
            return format!("Invalid URL: {}", url);
        }
        return "Invalid request".to_string();
    }
    if e.is_connect() {
        if let Some(url) = e.url() {
            if let Some(host) = url.host_str() {
                return format!("Could not connect to {}", host);
            }
        }
        return "Could not connect to server".to_string();
    }
    if e.is_timeout() {
        return "Connection timed out".to_string();
    }
    if e.is_decode() {
        return "Invalid response from server".to_string();
    }
    format!("Network error: {}", e)
}

/// What went wrong with a single analysis attempt.
///
/// Every failure lands in one of three buckets: the submission itself was
/// unusable, the backend could not be reached (or answered with an error
/// status), or it answered 2xx with a body that does not match its contract.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The submitted clip is unusable (empty, missing, wrong type)
    #[error("Input error: {0}")]
    Input(String),

    /// The backend was unreachable or returned an error status
    #[error("Communication error: {0}")]
    Communication(String),

    /// The backend answered 2xx but the body violated the contract
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AnalysisError::MalformedResponse(friendly_network_error(&e))
        } else {
            AnalysisError::Communication(friendly_network_error(&e))
        }
    }
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Playback engine errors
    #[error(transparent)]
    Engine(#[from] ClipError),

    /// Analysis errors (input, backend communication, bad responses)
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lookup failures (unknown record id, missing file)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Analysis(e.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Engine(ClipError::Io(e))
    }
}

/// Convenience result type for app operations
pub type Result<T> = std::result::Result<T, AppError>;
