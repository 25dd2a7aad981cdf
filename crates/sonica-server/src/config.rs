//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Filesystem path of the SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `./sonica.db`
    pub database_path: PathBuf,

    /// Filesystem path where uploaded and converted audio files are stored.
    /// Env: `AUDIO_STORAGE_PATH`
    /// Default: `./audio_files`
    pub audio_storage_path: PathBuf,

    /// URL prefix used when constructing download links returned to clients.
    /// Env: `PUBLIC_BASE_URL`
    /// Default: `http://localhost:8080`
    pub public_base_url: String,

    /// Maximum upload size in bytes (50 MiB).
    /// Env: `MAX_UPLOAD_SIZE`
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            database_path: PathBuf::from("./sonica.db"),
            audio_storage_path: PathBuf::from("./audio_files"),
            public_base_url: "http://localhost:8080".to_string(),
            max_upload_size: 50 * 1024 * 1024, // 50 MiB
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("AUDIO_STORAGE_PATH") {
            config.audio_storage_path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("PUBLIC_BASE_URL") {
            // A trailing slash would produce double slashes in download URLs.
            config.public_base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(val) = std::env::var("MAX_UPLOAD_SIZE") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_upload_size = n;
            } else {
                tracing::warn!(
                    value = %val,
                    "Invalid MAX_UPLOAD_SIZE, using default"
                );
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.database_path, PathBuf::from("./sonica.db"));
        assert_eq!(config.audio_storage_path, PathBuf::from("./audio_files"));
        assert_eq!(config.public_base_url, "http://localhost:8080");
        assert_eq!(config.max_upload_size, 50 * 1024 * 1024);
    }
}
