//! Error types for the shotscope engine

use thiserror::Error;

/// Errors that can occur while loading, probing, or playing a clip
#[derive(Error, Debug)]
pub enum ClipError {
    /// Audio device or playback errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// Format probing or decoding errors
    #[error("Decode error: {0}")]
    Decode(String),

    /// IO errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Convenience result type for engine operations
pub type Result<T> = std::result::Result<T, ClipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_error_display() {
        let err = ClipError::Audio("no output device".to_string());
        assert_eq!(err.to_string(), "Audio error: no output device");
    }

    #[test]
    fn decode_error_display() {
        let err = ClipError::Decode("unsupported format".to_string());
        assert_eq!(err.to_string(), "Decode error: unsupported format");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ClipError = io.into();
        assert!(matches!(err, ClipError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn timeout_display() {
        let err = ClipError::Timeout("probe took too long".to_string());
        assert!(err.to_string().starts_with("Timeout:"));
    }
}
