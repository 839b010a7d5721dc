use std::path::{Path, PathBuf};
use std::time::Duration;

/// A playable file in the playlist. Identity is `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Canonical absolute path.
    pub path: PathBuf,
    /// Display title.
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Unknown until probed (or given by a playlist entry).
    pub duration: Option<Duration>,
    /// Lower-case file extension, e.g. `"mp3"`.
    pub format: String,
}

impl Track {
    /// A track with only the path-derived fields filled in.
    pub fn bare(path: PathBuf) -> Self {
        let title = file_stem(&path);
        let format = format_tag(&path);
        Self {
            path,
            title,
            artist: None,
            album: None,
            duration: None,
            format,
        }
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}

pub(crate) fn format_tag(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}
