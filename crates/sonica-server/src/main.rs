//! # sonica-server
//!
//! HTTP backend for the sonica WAV-to-MP3 conversion service.
//!
//! This binary provides:
//! - **User registration** with a generated upload token
//! - **Audio upload** (multipart WAV) converted to MP3 via an external codec
//! - **Audio download/deletion** by client-facing public id
//! - **REST API** (axum) backed by a SQLite store and a flat audio directory

mod api;
mod audio_store;
mod auth;
mod config;
mod error;
mod transcoder;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sonica_store::Database;

use crate::api::AppState;
use crate::audio_store::AudioStore;
use crate::config::ServerConfig;
use crate::transcoder::FfmpegTranscoder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sonica_server=debug")),
        )
        .init();

    info!("Starting sonica server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // SQLite store (runs migrations on open)
    let db = Database::open(&config.database_path)?;

    // Audio file store (creates directory if missing)
    let audio_store =
        AudioStore::new(config.audio_storage_path.clone(), config.max_upload_size).await?;

    let app_state = AppState {
        db: Arc::new(Mutex::new(db)),
        audio_store: Arc::new(audio_store),
        transcoder: Arc::new(FfmpegTranscoder::new()),
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    // tokio::select! ensures that if either the HTTP server or a shutdown
    // signal arrives, we exit cleanly.
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
