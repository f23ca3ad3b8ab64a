//! Detection service trait

use shotscope::audio::AudioClip;

use crate::error::Result;

use super::types::{Detection, ServiceStatus};

/// A detection service that analyzes audio clips.
///
/// One attempt per call: no retries, no queueing. Callers own sequencing.
pub trait Detector: Send + Sync {
    /// Where this detector sends clips, for display
    fn endpoint(&self) -> String;

    /// Submit one clip for analysis
    fn submit(&self, clip: &AudioClip) -> Result<Detection>;

    /// Query service health and model state
    fn service_status(&self) -> Result<ServiceStatus>;
}
