//! File-backed audio source for terminal use, where there is no browser
//! microphone. "Recording" captures whatever WAV file sits at the configured
//! path when the capture is stopped.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{AudioClip, AudioSource, Capture};
use crate::error::RecordingError;

pub struct FileAudioSource {
    path: PathBuf,
}

impl FileAudioSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn map_io(path: &Path, err: std::io::Error) -> RecordingError {
    match err.kind() {
        ErrorKind::PermissionDenied => {
            RecordingError::PermissionDenied(format!("{}: {err}", path.display()))
        }
        ErrorKind::NotFound => RecordingError::Unavailable(format!("{} does not exist", path.display())),
        _ => RecordingError::Io(err),
    }
}

#[async_trait]
impl AudioSource for FileAudioSource {
    async fn open(&self) -> Result<Box<dyn Capture>, RecordingError> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| map_io(&self.path, e))?;
        if !meta.is_file() {
            return Err(RecordingError::Unavailable(format!(
                "{} is not a file",
                self.path.display()
            )));
        }
        debug!(path = %self.path.display(), "Audio capture opened");
        Ok(Box::new(FileCapture {
            path: self.path.clone(),
        }))
    }
}

struct FileCapture {
    path: PathBuf,
}

#[async_trait]
impl Capture for FileCapture {
    async fn finish(self: Box<Self>) -> Result<AudioClip, RecordingError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| map_io(&self.path, e))?;
        if bytes.is_empty() {
            return Err(RecordingError::Capture("no audio was captured".to_string()));
        }
        Ok(AudioClip::wav(bytes))
    }
}

impl Drop for FileCapture {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "Audio capture released");
    }
}
