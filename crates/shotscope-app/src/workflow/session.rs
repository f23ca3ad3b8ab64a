//! Analysis session state machine
//!
//! Sequences one analysis at a time: stage a clip, submit it on a worker
//! thread, fold the outcome into a record. Submissions carry a generation
//! number; a reset bumps the generation so a resolution from an abandoned
//! session arrives stale and is discarded instead of leaking into the new
//! one.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use shotscope::audio::AudioClip;

use crate::config::uploads::SUPPORTED_EXTENSIONS;
use crate::detector::{Detection, Detector};
use crate::error::{AnalysisError, AppError, Result};
use crate::history::HistoryStore;

use super::record::AnalysisRecord;

/// Lifecycle of one analysis session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Waiting for a clip, or holding one that has not been submitted
    #[default]
    Idle,
    /// A submission is in flight
    Analyzing,
    /// A result (or error record) is on display
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "Idle",
            SessionState::Analyzing => "Analyzing",
            SessionState::Complete => "Complete",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of one submission, tagged with the generation that started it
struct Resolution {
    generation: u64,
    outcome: std::result::Result<Detection, String>,
}

/// The analysis workflow: session state, staged clip, history
pub struct AnalysisWorkflow {
    detector: Arc<dyn Detector>,
    history: HistoryStore,
    state: SessionState,
    staged: Option<AudioClip>,
    active: Option<AnalysisRecord>,
    generation: u64,
    resolution_tx: Sender<Resolution>,
    resolution_rx: Receiver<Resolution>,
}

impl AnalysisWorkflow {
    /// Create a workflow around a detector
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        let (resolution_tx, resolution_rx) = unbounded();
        Self {
            detector,
            history: HistoryStore::new(),
            state: SessionState::default(),
            staged: None,
            active: None,
            generation: 0,
            resolution_tx,
            resolution_rx,
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The staged clip, if any
    pub fn staged(&self) -> Option<&AudioClip> {
        self.staged.as_ref()
    }

    /// The record currently on display
    pub fn active(&self) -> Option<&AnalysisRecord> {
        self.active.as_ref()
    }

    /// Completed analyses, most recent first
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Stage a clip for analysis, replacing any previous one and clearing
    /// the displayed result. Rejected while a submission is in flight.
    pub fn upload(&mut self, clip: AudioClip) -> Result<()> {
        if self.state == SessionState::Analyzing {
            return Err(
                AnalysisError::Input("an analysis is already in progress".to_string()).into(),
            );
        }
        if clip.is_empty() {
            return Err(AnalysisError::Input("audio clip is empty".to_string()).into());
        }
        self.staged = Some(clip);
        self.active = None;
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Stage a clip from disk, enforcing the supported extension list
    pub fn upload_path(&mut self, path: &Path) -> Result<()> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AnalysisError::Input(format!(
                "unsupported audio format '{}' (expected one of: {})",
                if ext.is_empty() { "none" } else { &ext },
                SUPPORTED_EXTENSIONS.join(", ")
            ))
            .into());
        }
        let clip = AudioClip::from_path(path)?;
        self.upload(clip)
    }

    /// Submit the staged clip on a worker thread.
    ///
    /// Returns false (and does nothing) unless the session is idle with a
    /// clip staged. The in-flight call resolves through [`poll`] or
    /// [`wait_for_complete`].
    ///
    /// [`poll`]: Self::poll
    /// [`wait_for_complete`]: Self::wait_for_complete
    pub fn start(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        let Some(clip) = self.staged.clone() else {
            return false;
        };

        self.generation += 1;
        let generation = self.generation;
        let detector = Arc::clone(&self.detector);
        let tx = self.resolution_tx.clone();

        thread::Builder::new()
            .name("analysis-submit".to_string())
            .spawn(move || {
                let outcome = detector.submit(&clip).map_err(|e| e.to_string());
                let _ = tx.send(Resolution {
                    generation,
                    outcome,
                });
            })
            .expect("Failed to spawn analysis-submit thread");

        self.state = SessionState::Analyzing;
        true
    }

    /// Deliver any pending resolutions. Returns true if a session completed.
    pub fn poll(&mut self) -> bool {
        let mut completed = false;
        while let Ok(res) = self.resolution_rx.try_recv() {
            if self.handle_resolution(res) {
                completed = true;
            }
        }
        completed
    }

    /// Block until the in-flight submission completes or the timeout passes.
    /// Returns true if the session reached `Complete`.
    pub fn wait_for_complete(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state == SessionState::Analyzing {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.resolution_rx.recv_timeout(remaining) {
                Ok(res) => {
                    self.handle_resolution(res);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
        self.state == SessionState::Complete
    }

    /// Clear the session back to empty idle. An in-flight submission is
    /// abandoned; its resolution will arrive stale and be discarded, so the
    /// next session can never show the previous session's result.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.staged = None;
        self.active = None;
        self.state = SessionState::Idle;
    }

    /// Put a past record back on display. The staged clip is left untouched.
    pub fn select_history(&mut self, id: &str) -> Result<()> {
        let record = self
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("no analysis with id '{}'", id)))?;
        self.active = Some(record);
        self.state = SessionState::Complete;
        Ok(())
    }

    /// Fold a resolution into the session. Stale generations are dropped.
    fn handle_resolution(&mut self, res: Resolution) -> bool {
        if res.generation != self.generation {
            // A reset or newer submission superseded this one
            return false;
        }
        let Some(clip) = self.staged.take() else {
            return false;
        };
        let record = match res.outcome {
            Ok(detection) => AnalysisRecord::success(clip, detection),
            Err(reason) => AnalysisRecord::failure(clip, reason),
        };
        self.history.push(record.clone());
        self.active = Some(record);
        self.state = SessionState::Complete;
        true
    }
}
