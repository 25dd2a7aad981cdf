//! WAV to MP3 conversion via an external codec.
//!
//! The codec is a black box to this service: it receives a WAV file on disk,
//! produces an MP3 sibling, and either succeeds or fails.  The default
//! implementation shells out to `ffmpeg`; tests substitute their own
//! [`Transcoder`] impls through the trait object held in `AppState`.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Failed to launch transcoder: {0}")]
    Spawn(String),

    #[error("Transcoding failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert the WAV file at `wav` into an MP3 file at `mp3`.
    async fn transcode(&self, wav: &Path, mp3: &Path) -> Result<(), TranscodeError>;
}

/// Transcoder backed by the `ffmpeg` binary.
pub struct FfmpegTranscoder {
    binary: String,
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, wav: &Path, mp3: &Path) -> Result<(), TranscodeError> {
        let output = tokio::process::Command::new(&self.binary)
            .arg("-y")
            .arg("-i")
            .arg(wav)
            .arg("-f")
            .arg("mp3")
            .arg(mp3)
            .output()
            .await
            .map_err(|e| TranscodeError::Spawn(format!("{}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // ffmpeg prints a banner before the actual error; the last
            // non-empty line is the useful one.
            let reason = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("unknown error")
                .to_string();

            warn!(
                input = %wav.display(),
                exit_code = output.status.code().unwrap_or(-1),
                reason = %reason,
                "Transcoding failed"
            );
            return Err(TranscodeError::Failed(reason));
        }

        debug!(input = %wav.display(), output = %mp3.display(), "Transcoded wav to mp3");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Transcoder doubles for handler and adapter tests.

    use super::*;

    /// Copies the input bytes verbatim to the output path.
    pub struct CopyTranscoder;

    #[async_trait]
    impl Transcoder for CopyTranscoder {
        async fn transcode(&self, wav: &Path, mp3: &Path) -> Result<(), TranscodeError> {
            tokio::fs::copy(wav, mp3)
                .await
                .map_err(|e| TranscodeError::Failed(e.to_string()))?;
            Ok(())
        }
    }

    /// Always fails without touching the output path.
    pub struct FailingTranscoder;

    #[async_trait]
    impl Transcoder for FailingTranscoder {
        async fn transcode(&self, _wav: &Path, _mp3: &Path) -> Result<(), TranscodeError> {
            Err(TranscodeError::Failed("synthetic codec failure".to_string()))
        }
    }
}
