//! On-disk storage for uploaded and converted audio files.
//!
//! Files live in a single flat directory.  Names are generated uuids, so
//! nothing user-controlled ever reaches the filesystem path.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;

/// Paths produced by storing one upload: the raw file as received and the
/// sibling location the converted MP3 will be written to.
#[derive(Debug, Clone)]
pub struct StoredWav {
    pub wav_path: PathBuf,
    pub mp3_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AudioStore {
    base_path: PathBuf,
    max_size: usize,
}

impl AudioStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ApiError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ApiError::Storage(format!(
                "Failed to create audio directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Audio store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Persist raw upload bytes under a generated `<uuid>.wav` name.
    ///
    /// Returns the written path together with the derived `.mp3` sibling
    /// path for the transcoder to fill in.
    pub async fn store_wav(&self, data: &[u8]) -> Result<StoredWav, ApiError> {
        if data.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ApiError::BadRequest(format!(
                "Uploaded file too large: {} bytes (max {})",
                data.len(),
                self.max_size
            )));
        }

        let name = Uuid::new_v4();
        let wav_path = self.base_path.join(format!("{name}.wav"));

        fs::write(&wav_path, data).await.map_err(|e| {
            ApiError::Storage(format!(
                "Failed to write '{}': {}",
                wav_path.display(),
                e
            ))
        })?;

        debug!(path = %wav_path.display(), size = data.len(), "Stored uploaded wav");

        let mp3_path = wav_path.with_extension("mp3");
        Ok(StoredWav { wav_path, mp3_path })
    }

    /// Read a stored file back for download.
    ///
    /// A record always points at a file this store wrote earlier, so a
    /// missing file is a server-side inconsistency, not a client error.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, ApiError> {
        let data = fs::read(path).await.map_err(|e| {
            ApiError::Storage(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        debug!(path = %path.display(), size = data.len(), "Read stored audio");
        Ok(data)
    }

    /// Remove a stored file.  Used by operational cleanup, not by the request
    /// handlers.
    #[allow(dead_code)]
    pub async fn remove(&self, path: &Path) -> Result<(), ApiError> {
        fs::remove_file(path).await.map_err(|e| {
            ApiError::Storage(format!("Failed to delete '{}': {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "Deleted stored audio");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (AudioStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = AudioStore::new(dir.path().join("audio"), 1024 * 1024)
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let (store, _dir) = test_store().await;
        let data = b"RIFF....WAVEfmt ";

        let stored = store.store_wav(data).await.unwrap();
        assert_eq!(stored.wav_path.extension().unwrap(), "wav");
        assert_eq!(stored.mp3_path.extension().unwrap(), "mp3");
        assert_eq!(stored.wav_path.with_extension("mp3"), stored.mp3_path);

        let read_back = store.read(&stored.wav_path).await.unwrap();
        assert_eq!(read_back, data);
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let (store, _dir) = test_store().await;
        assert!(matches!(
            store.store_wav(b"").await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let dir = TempDir::new().unwrap();
        let store = AudioStore::new(dir.path().join("audio"), 8).await.unwrap();

        assert!(matches!(
            store.store_wav(b"way too many bytes").await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_generated_names_are_distinct() {
        let (store, _dir) = test_store().await;

        let a = store.store_wav(b"first").await.unwrap();
        let b = store.store_wav(b"second").await.unwrap();
        assert_ne!(a.wav_path, b.wav_path);
    }

    #[tokio::test]
    async fn test_remove() {
        let (store, _dir) = test_store().await;

        let stored = store.store_wav(b"delete-me").await.unwrap();
        store.remove(&stored.wav_path).await.unwrap();
        assert!(store.read(&stored.wav_path).await.is_err());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_storage_error() {
        let (store, _dir) = test_store().await;
        let missing = store.base_path().join("nope.mp3");
        assert!(matches!(
            store.read(&missing).await,
            Err(ApiError::Storage(_))
        ));
    }
}
