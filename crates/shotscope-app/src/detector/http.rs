//! HTTP detection gateway
//!
//! Talks to the Python detection backend: multipart upload to the analyze
//! endpoint, JSON status probe at the root. Response interpretation follows
//! one rule: non-2xx is a communication failure (with the backend's detail
//! text when present), 2xx with an uninterpretable body is malformed.

use shotscope::audio::AudioClip;

use crate::config::backend::{base_url, ANALYZE_PATH, UPLOAD_FIELD};
use crate::error::{AnalysisError, Result};
use crate::network::HttpClient;

use super::traits::Detector;
use super::types::{Detection, ServiceStatus};
use super::wire::{WireAnalyzeResponse, WireErrorBody, WireServiceStatus};

/// Gateway to the HTTP detection backend
pub struct HttpDetector {
    client: HttpClient,
    base_url: String,
}

impl HttpDetector {
    /// Create a gateway against the configured backend URL
    /// (environment override, then the default)
    pub fn new() -> Result<Self> {
        Self::with_base_url(base_url())
    }

    /// Create a gateway against a specific base URL
    pub fn with_base_url(base: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base.into().trim_end_matches('/').to_string(),
        })
    }

    /// The configured backend base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Detector for HttpDetector {
    fn endpoint(&self) -> String {
        self.url(ANALYZE_PATH)
    }

    fn submit(&self, clip: &AudioClip) -> Result<Detection> {
        if clip.is_empty() {
            return Err(AnalysisError::Input("audio clip is empty".to_string()).into());
        }
        if clip.filename().trim().is_empty() {
            return Err(AnalysisError::Input("audio clip has no filename".to_string()).into());
        }

        let response = self.client.post_file(
            &self.url(ANALYZE_PATH),
            UPLOAD_FIELD,
            clip.filename(),
            clip.bytes().to_vec(),
        )?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<WireErrorBody>()
                .ok()
                .map(|b| b.detail)
                .filter(|d| !d.trim().is_empty());
            let reason = detail
                .unwrap_or_else(|| format!("backend returned status {}", status.as_u16()));
            return Err(AnalysisError::Communication(reason).into());
        }

        let wire: WireAnalyzeResponse = response.json().map_err(|e| {
            AnalysisError::MalformedResponse(format!("could not parse analysis response: {}", e))
        })?;
        Ok(wire.into())
    }

    fn service_status(&self) -> Result<ServiceStatus> {
        let wire: WireServiceStatus = self.client.get_json(&self.url("/"))?;
        Ok(wire.into())
    }
}
