//! Configuration constants for shotscope app services

/// Application metadata
pub mod app {
    /// Application name
    pub const NAME: &str = "Shotscope";
}

/// Detection backend configuration
pub mod backend {
    /// Default backend base URL
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

    /// Environment variable overriding the backend base URL
    pub const BASE_URL_ENV: &str = "SHOTSCOPE_BACKEND_URL";

    /// Analysis endpoint path
    pub const ANALYZE_PATH: &str = "/api/analyze";

    /// Multipart field name the backend expects
    pub const UPLOAD_FIELD: &str = "file";

    /// Resolve the backend base URL: environment override, then default
    pub fn base_url() -> String {
        std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
    }
}

/// Network configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Shotscope/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds. Model inference can take a while on a
    /// cold backend, so this is generous.
    pub const READ_TIMEOUT_SECS: u64 = 60;
}

/// Local bridge endpoint configuration
pub mod bridge {
    /// Default bind address
    pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

    /// Route the bridge serves
    pub const ANALYZE_ROUTE: &str = "/api/analyze-audio";

    /// Multipart field name accepted from clients
    pub const UPLOAD_FIELD: &str = "audio";

    /// Maximum accepted upload size in bytes
    pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
}

/// Upload staging configuration
pub mod uploads {
    /// File extensions accepted for staging
    pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "aac", "ogg", "flac"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_includes_version() {
        assert!(network::USER_AGENT.starts_with("Shotscope/"));
        assert!(network::USER_AGENT.len() > "Shotscope/".len());
    }

    #[test]
    fn test_default_base_url_has_no_trailing_slash() {
        assert!(!backend::DEFAULT_BASE_URL.ends_with('/'));
    }

    #[test]
    fn test_supported_extensions_are_lowercase() {
        for ext in uploads::SUPPORTED_EXTENSIONS {
            assert_eq!(*ext, ext.to_lowercase());
        }
    }
}
