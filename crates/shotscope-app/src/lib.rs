//! Shotscope App Services
//!
//! Detector clients, the analysis workflow, history, and the local HTTP
//! bridge. Depends on the `shotscope` engine crate.

pub mod bridge;
pub mod config;
pub mod detector;
pub mod error;
pub mod history;
pub mod network;
pub mod workflow;
