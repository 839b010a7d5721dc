use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::LibrarySettings;
use crate::error::{PlayerError, Result};
use crate::library::{Track, probe};

use super::m3u;

/// Ordered list of tracks. Insertion order is playback order.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    settings: LibrarySettings,
}

impl Playlist {
    /// Create an empty playlist that probes new files with `settings`.
    pub fn new(settings: LibrarySettings) -> Self {
        Self {
            tracks: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Whether a track with this file is already listed.
    pub fn contains(&self, path: &Path) -> bool {
        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.tracks.iter().any(|t| t.path == canonical)
    }

    /// Probe the file at `path` and append it. Returns the new track's index.
    pub fn add(&mut self, path: &Path) -> Result<usize> {
        let track = probe(path, &self.settings)?;
        debug!("added {}", track.path.display());
        Ok(self.push(track))
    }

    /// Append an already-built track. Returns its index.
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<Track> {
        PlayerError::check_index(index, self.tracks.len())?;
        Ok(self.tracks.remove(index))
    }

    /// Move the track at `from` so that it ends up at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        PlayerError::check_index(from, self.tracks.len())?;
        PlayerError::check_index(to, self.tracks.len())?;
        if from != to {
            let track = self.tracks.remove(from);
            self.tracks.insert(to, track);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Append the entries of the M3U file at `path`. Returns how many tracks were added.
    ///
    /// Entries whose file does not exist are skipped. Only an unreadable
    /// playlist file is an error.
    pub fn import_m3u(&mut self, path: &Path) -> Result<usize> {
        let bytes = fs::read(path).map_err(|source| PlayerError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let base = path.parent().unwrap_or(Path::new("."));

        let mut added = 0;
        for entry in m3u::parse(&text, base) {
            let canonical = match fs::canonicalize(&entry.path) {
                Ok(p) if p.is_file() => p,
                _ => {
                    warn!(
                        "{}: skipping missing entry {}",
                        path.display(),
                        entry.path.display()
                    );
                    continue;
                }
            };
            let track = self.entry_track(canonical, entry.title, entry.duration);
            self.push(track);
            added += 1;
        }

        info!("imported {added} tracks from {}", path.display());
        Ok(added)
    }

    /// Write the playlist as extended M3U, creating parent directories.
    pub fn export_m3u(&self, path: &Path) -> Result<()> {
        let write_failed = |source| PlayerError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        fs::write(path, m3u::render(&self.tracks)).map_err(write_failed)?;
        info!("exported {} tracks to {}", self.tracks.len(), path.display());
        Ok(())
    }

    fn entry_track(
        &self,
        path: std::path::PathBuf,
        title: Option<String>,
        duration: Option<Duration>,
    ) -> Track {
        let mut track = if title.is_some() && duration.is_some() {
            Track::bare(path)
        } else {
            match probe(&path, &self.settings) {
                Ok(t) => t,
                Err(e) => {
                    debug!("{e}");
                    Track::bare(path)
                }
            }
        };
        if let Some(title) = title {
            track.title = title;
        }
        if duration.is_some() {
            track.duration = duration;
        }
        track
    }
}
