//! Analysis records
//!
//! One record per completed analysis, immutable once created. Failures are
//! records too: the error text rides along instead of a verdict, so history
//! keeps every attempt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use shotscope::audio::AudioClip;

use crate::detector::Detection;

static RECORD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique creation-ordered id: `<unix-millis>-<sequence>`
fn next_record_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = RECORD_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", millis, seq)
}

/// Remediation steps shown alongside failed analyses
const SETUP_HINT: &str = "Check that the detection backend is running:\n  \
    1. cd backend\n  \
    2. pip install -r requirements.txt\n  \
    3. python main.py\n\
    Then confirm it answers on the configured URL.";

/// One completed analysis, success or failure
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    id: String,
    filename: String,
    timestamp: SystemTime,
    detected: bool,
    confidence: Option<f64>,
    risk_level: Option<String>,
    method: Option<String>,
    features: Option<serde_json::Value>,
    detections: Vec<serde_json::Value>,
    clip: AudioClip,
    error: Option<String>,
}

impl AnalysisRecord {
    /// Record a successful analysis
    pub fn success(clip: AudioClip, detection: Detection) -> Self {
        Self {
            id: next_record_id(),
            filename: clip.filename().to_string(),
            timestamp: SystemTime::now(),
            detected: detection.detected,
            confidence: Some(detection.confidence),
            risk_level: detection.risk_level,
            method: detection.method,
            features: detection.features,
            detections: detection.detections,
            clip,
            error: None,
        }
    }

    /// Record a failed analysis attempt
    pub fn failure(clip: AudioClip, reason: impl Into<String>) -> Self {
        Self {
            id: next_record_id(),
            filename: clip.filename().to_string(),
            timestamp: SystemTime::now(),
            detected: false,
            confidence: None,
            risk_level: None,
            method: None,
            features: None,
            detections: Vec::new(),
            clip,
            error: Some(reason.into()),
        }
    }

    /// Unique record id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Filename of the analyzed clip
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// When this record was created (client side)
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Creation time formatted for display
    pub fn timestamp_display(&self) -> String {
        let local: chrono::DateTime<chrono::Local> = self.timestamp.into();
        local.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Whether a gunshot was detected
    pub fn detected(&self) -> bool {
        self.detected
    }

    /// Confidence as a fraction in [0, 1]; `None` for failed attempts
    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    /// Confidence scaled for display: 0.93 renders as 93.0
    pub fn confidence_percent(&self) -> Option<f64> {
        self.confidence.map(|c| c * 100.0)
    }

    /// Qualitative risk level, when the backend reported one
    pub fn risk_level(&self) -> Option<&str> {
        self.risk_level.as_deref()
    }

    /// Analysis method identifier
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Extracted audio features
    pub fn features(&self) -> Option<&serde_json::Value> {
        self.features.as_ref()
    }

    /// Per-event detections within the clip
    pub fn detections(&self) -> &[serde_json::Value] {
        &self.detections
    }

    /// The analyzed clip, for replay
    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }

    /// Error text for failed attempts
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether this record is a failed attempt
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// One-line verdict, e.g. "Gunshot detected (93.0% confidence)"
    pub fn verdict_line(&self) -> String {
        if let Some(reason) = &self.error {
            return format!("Analysis failed: {}", reason);
        }
        let verdict = if self.detected {
            "Gunshot detected"
        } else {
            "No gunshot detected"
        };
        match self.confidence_percent() {
            Some(pct) => format!("{} ({:.1}% confidence)", verdict, pct),
            None => verdict.to_string(),
        }
    }

    /// Remediation steps, present only for failed attempts
    pub fn setup_hint(&self) -> Option<&'static str> {
        if self.is_error() {
            Some(SETUP_HINT)
        } else {
            None
        }
    }
}
