//! Bridge response bodies
//!
//! The JSON contract the frontend consumes. Field names are camelCase on
//! the wire; absent values serialize as null rather than disappearing.

use serde::Serialize;

use crate::detector::Detection;

/// Successful analysis response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub detected: bool,
    /// Fraction in [0, 1]; the frontend scales it for display
    pub confidence: f64,
    #[serde(rename = "riskLevel")]
    pub risk_level: Option<String>,
    pub features: Option<serde_json::Value>,
    pub detections: Vec<serde_json::Value>,
    pub filename: String,
    pub timestamp: String,
    #[serde(rename = "modelInfo")]
    pub model_info: ModelInfo,
}

/// Model metadata included with every successful response
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub method: Option<String>,
}

impl AnalyzeResponse {
    /// Shape a detection for the wire. The uploaded filename fills in when
    /// the backend does not echo one; the timestamp falls back to now.
    pub fn from_detection(detection: Detection, fallback_filename: &str) -> Self {
        Self {
            detected: detection.detected,
            confidence: detection.confidence,
            risk_level: detection.risk_level,
            features: detection.features,
            detections: detection.detections,
            filename: detection
                .filename
                .unwrap_or_else(|| fallback_filename.to_string()),
            timestamp: detection
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            model_info: ModelInfo {
                method: detection.method,
            },
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// A bare error message
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// An error message with supporting detail
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
