//! Shared HTTP client wrapper
//!
//! Centralizes user agent and timeout configuration so every request to the
//! detection backend behaves the same way.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::network::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, USER_AGENT};
use crate::error::Result;

/// HTTP client with shared configuration
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a new client with the standard configuration
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// GET a URL and deserialize the JSON response.
    ///
    /// Non-2xx statuses are reported as communication errors.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let parsed = response.json()?;
        Ok(parsed)
    }

    /// POST a single file as a multipart form and return the raw response.
    ///
    /// The caller interprets the status code, so error bodies stay readable.
    pub fn post_file(
        &self,
        url: &str,
        field: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<reqwest::blocking::Response> {
        let part = reqwest::blocking::multipart::Part::bytes(bytes)
            .file_name(filename.to_string());
        let form = reqwest::blocking::multipart::Form::new().part(field.to_string(), part);
        let response = self.client.post(url).multipart(form).send()?;
        Ok(response)
    }

    /// Access the underlying reqwest client
    pub fn inner(&self) -> &reqwest::blocking::Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, AppError};

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_inner_access() {
        let client = HttpClient::new().unwrap();
        let _raw = client.inner();
    }

    #[test]
    fn test_get_json_unreachable_host() {
        let client = HttpClient::new().unwrap();
        let result: Result<serde_json::Value> =
            client.get_json("http://invalid.invalid.invalid/status");
        assert!(matches!(
            result,
            Err(AppError::Analysis(AnalysisError::Communication(_)))
        ));
    }

    #[test]
    fn test_post_file_unreachable_host() {
        let client = HttpClient::new().unwrap();
        let result = client.post_file(
            "http://invalid.invalid.invalid/api/analyze",
            "file",
            "clip.wav",
            vec![0u8; 16],
        );
        assert!(matches!(
            result,
            Err(AppError::Analysis(AnalysisError::Communication(_)))
        ));
    }
}
