//! Voice capture: the microphone side of voice notes.
//!
//! An [`AudioSource`] hands out at most one live [`Capture`] per request.
//! The capture owns the recording hardware: finishing it yields an
//! [`AudioClip`], and dropping it unfinished releases the device without
//! producing audio.

pub mod file;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RecordingError;

pub use file::FileAudioSource;

/// Packaged audio ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl AudioClip {
    /// A WAV clip named the way the transcription endpoint expects.
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "audio/wav".to_string(),
            file_name: "recording.wav".to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Something that can open the microphone.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Acquire the input device and begin capturing.
    ///
    /// Permission problems surface here as
    /// [`RecordingError::PermissionDenied`].
    async fn open(&self) -> Result<Box<dyn Capture>, RecordingError>;
}

/// A live capture session.
///
/// Implementations must release the device both in `finish` and in `Drop`.
#[async_trait]
pub trait Capture: Send {
    /// Stop capturing, release the device, and return what was recorded.
    async fn finish(self: Box<Self>) -> Result<AudioClip, RecordingError>;
}

/// Format a recording clock as `m:ss`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
