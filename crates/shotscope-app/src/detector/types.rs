//! Domain types for detection results

/// Outcome of one backend analysis
#[derive(Debug, Clone)]
pub struct Detection {
    /// Whether a gunshot was detected
    pub detected: bool,
    /// Confidence as a fraction in [0, 1], exactly as the backend reported it.
    /// Scale to a percentage only at the presentation edge.
    pub confidence: f64,
    /// Raw model probability, when the backend distinguishes it
    pub probability: Option<f64>,
    /// Qualitative risk level ("high", "medium", "low")
    pub risk_level: Option<String>,
    /// Analysis method identifier (e.g. "cnn_spectrogram")
    pub method: Option<String>,
    /// Backend-side timestamp, passed through untouched
    pub timestamp: Option<String>,
    /// Filename the backend echoed back
    pub filename: Option<String>,
    /// Extracted audio features, shape defined by the backend
    pub features: Option<serde_json::Value>,
    /// Per-event detections within the clip
    pub detections: Vec<serde_json::Value>,
}

/// Backend service health
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    /// Service name
    pub service: Option<String>,
    /// Service version
    pub version: Option<String>,
    /// Reported status string (e.g. "online")
    pub status: Option<String>,
    /// Whether the detection model is loaded
    pub model_loaded: bool,
    /// Model details, shape defined by the backend
    pub model_info: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_cloneable() {
        let detection = Detection {
            detected: true,
            confidence: 0.93,
            probability: Some(0.91),
            risk_level: Some("high".to_string()),
            method: Some("cnn_spectrogram".to_string()),
            timestamp: None,
            filename: Some("shot.wav".to_string()),
            features: None,
            detections: Vec::new(),
        };
        let copy = detection.clone();
        assert!(copy.detected);
        assert_eq!(copy.confidence, 0.93);
    }

    #[test]
    fn test_service_status_fields() {
        let status = ServiceStatus {
            service: Some("Gunshot Detection API".to_string()),
            version: Some("1.0.0".to_string()),
            status: Some("online".to_string()),
            model_loaded: true,
            model_info: None,
        };
        assert!(status.model_loaded);
        assert_eq!(status.status.as_deref(), Some("online"));
    }
}
