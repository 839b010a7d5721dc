//! The seam between the playback controller and whatever produces sound.

use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unsupported or corrupt audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("no audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("seek failed: {0}")]
    Seek(#[from] rodio::source::SeekError),
    #[error("no track is open")]
    NotOpen,
    #[error("{0}")]
    Other(String),
}

/// Decode/output engine driven by the playback controller.
///
/// Implementations own their output thread; the controller only issues
/// commands and polls the reported position.
pub trait PlaybackBackend {
    /// Open `path` and prepare it paused at position zero, replacing any open track.
    fn open(&mut self, path: &Path) -> Result<(), BackendError>;
    fn play(&mut self);
    fn pause(&mut self);
    /// Stop output and close the current track.
    fn stop(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), BackendError>;
    fn position(&self) -> Duration;
    /// Length of the open track, when the decoder knows it.
    fn duration(&self) -> Option<Duration>;
    /// Volume in percent, 0..=100.
    fn set_volume(&mut self, level: u8);
    /// True once the open track has played out completely.
    fn is_drained(&self) -> bool {
        false
    }
}
