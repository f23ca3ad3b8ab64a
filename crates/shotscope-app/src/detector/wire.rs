//! Backend wire format
//!
//! Serde mappings for the detection backend's JSON bodies. These stay
//! internal; [`Detection`] and [`ServiceStatus`] are the domain-facing
//! shapes. Detection verdict and confidence are required, everything else
//! degrades to `None` when absent or empty.

use serde::Deserialize;

use super::types::{Detection, ServiceStatus};

/// Convert an empty or whitespace string to None
fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Response body of a successful analysis call
#[derive(Debug, Deserialize)]
pub(crate) struct WireAnalyzeResponse {
    #[serde(default)]
    pub filename: String,
    pub analysis: WireAnalysis,
    #[serde(default)]
    pub audio_features: Option<serde_json::Value>,
    #[serde(default)]
    pub detections: Vec<serde_json::Value>,
}

/// The analysis block of a backend response
#[derive(Debug, Deserialize)]
pub(crate) struct WireAnalysis {
    pub gunshot_detected: bool,
    pub confidence: f64,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Error body the backend attaches to non-2xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct WireErrorBody {
    #[serde(default)]
    pub detail: String,
}

/// Response body of the service status endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct WireServiceStatus {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub model_info: Option<serde_json::Value>,
}

impl From<WireAnalyzeResponse> for Detection {
    fn from(wire: WireAnalyzeResponse) -> Self {
        Detection {
            detected: wire.analysis.gunshot_detected,
            confidence: wire.analysis.confidence,
            probability: wire.analysis.probability,
            risk_level: non_empty(&wire.analysis.risk_level),
            method: non_empty(&wire.analysis.method),
            timestamp: non_empty(&wire.analysis.timestamp),
            filename: non_empty(&wire.filename),
            features: wire.audio_features,
            detections: wire.detections,
        }
    }
}

impl From<WireServiceStatus> for ServiceStatus {
    fn from(wire: WireServiceStatus) -> Self {
        ServiceStatus {
            service: non_empty(&wire.service),
            version: non_empty(&wire.version),
            status: non_empty(&wire.status),
            model_loaded: wire.model_loaded,
            model_info: wire.model_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank_strings() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty("cnn"), Some("cnn".to_string()));
        assert_eq!(non_empty("  cnn  "), Some("cnn".to_string()));
    }

    #[test]
    fn test_full_response_deserializes() {
        let json = r#"{
            "success": true,
            "filename": "shot.wav",
            "analysis": {
                "gunshot_detected": true,
                "confidence": 0.93,
                "probability": 0.91,
                "risk_level": "high",
                "method": "cnn_spectrogram",
                "timestamp": "2026-08-25T10:30:00"
            },
            "audio_features": {"rms": 0.4, "spectral_centroid": 2400.0},
            "detections": [{"start": 1.2, "end": 1.4}]
        }"#;
        let wire: WireAnalyzeResponse = serde_json::from_str(json).unwrap();
        let detection: Detection = wire.into();
        assert!(detection.detected);
        assert_eq!(detection.confidence, 0.93);
        assert_eq!(detection.probability, Some(0.91));
        assert_eq!(detection.risk_level.as_deref(), Some("high"));
        assert_eq!(detection.method.as_deref(), Some("cnn_spectrogram"));
        assert_eq!(detection.filename.as_deref(), Some("shot.wav"));
        assert!(detection.features.is_some());
        assert_eq!(detection.detections.len(), 1);
    }

    #[test]
    fn test_minimal_response_deserializes() {
        let json = r#"{"analysis": {"gunshot_detected": false, "confidence": 0.02}}"#;
        let wire: WireAnalyzeResponse = serde_json::from_str(json).unwrap();
        let detection: Detection = wire.into();
        assert!(!detection.detected);
        assert_eq!(detection.confidence, 0.02);
        assert_eq!(detection.probability, None);
        assert_eq!(detection.risk_level, None);
        assert_eq!(detection.method, None);
        assert_eq!(detection.filename, None);
        assert_eq!(detection.features, None);
        assert!(detection.detections.is_empty());
    }

    #[test]
    fn test_missing_verdict_is_an_error() {
        let json = r#"{"analysis": {"confidence": 0.5}}"#;
        assert!(serde_json::from_str::<WireAnalyzeResponse>(json).is_err());
    }

    #[test]
    fn test_missing_confidence_is_an_error() {
        let json = r#"{"analysis": {"gunshot_detected": true}}"#;
        assert!(serde_json::from_str::<WireAnalyzeResponse>(json).is_err());
    }

    #[test]
    fn test_missing_analysis_block_is_an_error() {
        let json = r#"{"filename": "shot.wav"}"#;
        assert!(serde_json::from_str::<WireAnalyzeResponse>(json).is_err());
    }

    #[test]
    fn test_empty_strings_become_none() {
        let json = r#"{
            "filename": "",
            "analysis": {"gunshot_detected": true, "confidence": 1.0, "risk_level": "  ", "method": ""}
        }"#;
        let detection: Detection = serde_json::from_str::<WireAnalyzeResponse>(json)
            .unwrap()
            .into();
        assert_eq!(detection.filename, None);
        assert_eq!(detection.risk_level, None);
        assert_eq!(detection.method, None);
    }

    #[test]
    fn test_error_body_detail() {
        let body: WireErrorBody =
            serde_json::from_str(r#"{"detail": "File must be an audio file"}"#).unwrap();
        assert_eq!(body.detail, "File must be an audio file");
    }

    #[test]
    fn test_error_body_without_detail() {
        let body: WireErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.detail, "");
    }

    #[test]
    fn test_service_status_deserializes() {
        let json = r#"{
            "service": "Gunshot Detection API",
            "version": "1.0.0",
            "status": "online",
            "model_loaded": true,
            "model_info": {"method": "cnn_spectrogram"}
        }"#;
        let status: ServiceStatus = serde_json::from_str::<WireServiceStatus>(json)
            .unwrap()
            .into();
        assert_eq!(status.service.as_deref(), Some("Gunshot Detection API"));
        assert!(status.model_loaded);
        assert!(status.model_info.is_some());
    }

    #[test]
    fn test_service_status_all_defaults() {
        let status: ServiceStatus = serde_json::from_str::<WireServiceStatus>("{}")
            .unwrap()
            .into();
        assert_eq!(status.service, None);
        assert!(!status.model_loaded);
    }
}
