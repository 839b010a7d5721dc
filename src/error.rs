//! Error type shared by the playlist, playback and session layers.

use std::path::PathBuf;

/// Result alias that carries [`PlayerError`].
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Everything that can go wrong while managing the playlist or driving playback.
///
/// None of these are fatal: the runtime turns them into a status message and
/// keeps going.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// A track could not be added: bad path, unsupported extension or unreadable contents.
    #[error("cannot read {}: {reason}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    /// The playlist file itself could not be read.
    #[error("cannot read playlist {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The playlist file could not be written.
    #[error("cannot write playlist {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("track {index} is out of range (playlist has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The playback backend refused to open or decode a track.
    #[error("cannot play {}: {reason}", path.display())]
    Playback { path: PathBuf, reason: String },
}

impl PlayerError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Self::IndexOutOfRange { index, len })
        }
    }
}
