//! Analysis workflow
//!
//! The session state machine (idle, analyzing, complete) and the records
//! it produces.

pub mod record;
pub mod session;

// Re-exports
pub use record::AnalysisRecord;
pub use session::{AnalysisWorkflow, SessionState};
