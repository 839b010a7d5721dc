use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/miniamp/config.toml` or `~/.config/miniamp/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MINIAMP__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub playback: PlaybackSettings,
    pub equalizer: EqualizerSettings,
    pub library: LibrarySettings,
    pub playlist: PlaylistSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial output volume, 0..=100.
    pub volume: u8,
    /// Interval of the refresh tick (milliseconds). Drives end-of-track
    /// detection, the elapsed-time display and the equalizer.
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 70,
            tick_ms: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which time fields to show for the now-playing line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub now_playing_time_fields: Vec<TimeField>,

    /// Separator used to join `now_playing_time_fields`.
    pub now_playing_time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ miniamp ~ ".to_string(),
            now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Total],
            now_playing_time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to seek when pressing `H` / `L`.
    pub seek_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5,
            volume_step: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Default loop mode.
    pub loop_mode: LoopModeSetting,
}

#[derive(Debug, Copy, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopModeSetting {
    #[default]
    #[serde(alias = "no_loop", alias = "no-loop", alias = "off")]
    NoLoop,
    #[serde(
        alias = "loopall",
        alias = "loop_all",
        alias = "loop-all",
        alias = "repeat"
    )]
    LoopAll,
    #[serde(
        alias = "loopone",
        alias = "loop_one",
        alias = "loop-one",
        alias = "repeat-one"
    )]
    LoopOne,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EqualizerSettings {
    /// Number of frequency bands shown.
    pub bands: usize,
    /// Length of the analysis window (milliseconds).
    pub window_ms: u64,
    /// Weight of the newest analysis in the displayed level, in (0, 1].
    /// 1.0 disables smoothing.
    pub smoothing: f32,
    /// Lower edge of the first band (Hz).
    pub min_hz: f32,
    /// Upper edge of the last band (Hz), capped at Nyquist.
    pub max_hz: f32,
}

impl Default for EqualizerSettings {
    fn default() -> Self {
        Self {
            bands: 20,
            window_ms: 100,
            smoothing: 0.4,
            min_hz: 20.0,
            max_hz: 20_000.0,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    Title,
    Artist,
    Album,
    Filename,
    Path,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when scanning folders.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,

    /// Which fields to use to build a track's display title and their order.
    ///
    /// Example: ["artist", "title"] -> "Artist - Title"
    pub title_fields: Vec<TrackDisplayField>,
    /// Separator used to join `title_fields`.
    pub title_separator: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "wav".into(),
                "m4a".into(),
                "aac".into(),
                "ogg".into(),
                "flac".into(),
            ],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
            title_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            title_separator: " - ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Where `w` saves and `o` reloads the playlist. Defaults to
    /// `$XDG_DATA_HOME/miniamp/playlist.m3u`.
    pub path: Option<PathBuf>,
    /// Start playing the first added track when nothing is playing yet.
    pub autoplay: bool,
    /// Load `path` on startup.
    pub restore_on_start: bool,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            path: None,
            autoplay: true,
            restore_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file. Defaults to `$XDG_STATE_HOME/miniamp/miniamp.log`.
    pub file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}
