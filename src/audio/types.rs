//! Small playback enums shared by the controller, session and UI.

use crate::config::LoopModeSetting;

/// The playback state of the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Stop when running past either end of the playlist.
    #[default]
    NoLoop,
    /// Wrap around to the other end of the playlist.
    LoopAll,
    /// Repeat the current track when it ends. Manual skips wrap like `LoopAll`.
    LoopOne,
}

impl LoopMode {
    /// Whether manual next/previous wrap at the ends.
    pub fn wraps(self) -> bool {
        !matches!(self, Self::NoLoop)
    }

    /// Cycle `NoLoop -> LoopAll -> LoopOne -> NoLoop`.
    pub fn cycle(self) -> Self {
        match self {
            Self::NoLoop => Self::LoopAll,
            Self::LoopAll => Self::LoopOne,
            Self::LoopOne => Self::NoLoop,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NoLoop => "No-loop",
            Self::LoopAll => "Loop-all",
            Self::LoopOne => "Repeat-one",
        }
    }
}

impl From<LoopModeSetting> for LoopMode {
    fn from(s: LoopModeSetting) -> Self {
        match s {
            LoopModeSetting::NoLoop => Self::NoLoop,
            LoopModeSetting::LoopAll => Self::LoopAll,
            LoopModeSetting::LoopOne => Self::LoopOne,
        }
    }
}
