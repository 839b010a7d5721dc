//! The context object that owns the playlist, the playback controller and
//! the equalizer sampler. Every user command goes through here so that the
//! three stay consistent.

use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};

use crate::audio::{LoopMode, PlaybackBackend, PlaybackController, PlaybackState};
use crate::config::Settings;
use crate::equalizer::{EqualizerSampler, EqualizerSnapshot};
use crate::error::{PlayerError, Result};
use crate::library::{Track, is_audio_file, is_playlist_file, scan};
use crate::playlist::Playlist;

#[cfg(test)]
mod tests;

/// Outcome of a bulk add: what went in, what was already there, what failed.
#[derive(Debug, Default)]
pub struct AddReport {
    pub added: usize,
    pub duplicates: usize,
    pub errors: Vec<PlayerError>,
}

impl AddReport {
    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        let mut msg = format!("added {} track(s)", self.added);
        if self.duplicates > 0 {
            msg.push_str(&format!(", {} already listed", self.duplicates));
        }
        match self.errors.as_slice() {
            [] => {}
            [only] => msg.push_str(&format!(", {only}")),
            many => msg.push_str(&format!(", {} failed (last: {})", many.len(), many[many.len() - 1])),
        }
        msg
    }
}

pub struct Session {
    playlist: Playlist,
    controller: PlaybackController,
    sampler: EqualizerSampler,
    snapshot: EqualizerSnapshot,
    autoplay: bool,
    /// `controller.started()` at the time the sampler was last loaded.
    sampled_start: u64,
}

impl Session {
    pub fn new(settings: &Settings, backend: Box<dyn PlaybackBackend>) -> Self {
        Self::with_parts(
            Playlist::new(settings.library.clone()),
            PlaybackController::new(backend, settings.audio.volume),
            EqualizerSampler::new(&settings.equalizer),
            settings.playlist.autoplay,
        )
    }

    pub fn with_parts(
        playlist: Playlist,
        controller: PlaybackController,
        sampler: EqualizerSampler,
        autoplay: bool,
    ) -> Self {
        let snapshot = EqualizerSnapshot::idle(sampler.bands());
        let sampled_start = controller.started();
        Self {
            playlist,
            controller,
            sampler,
            snapshot,
            autoplay,
            sampled_start,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn current(&self) -> Option<usize> {
        self.controller.current()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.controller.current().and_then(|i| self.playlist.get(i))
    }

    pub fn elapsed(&self) -> Duration {
        self.controller.elapsed()
    }

    /// Length of the playing track: backend's figure first, probed tag second.
    pub fn duration(&self) -> Option<Duration> {
        self.controller
            .duration()
            .or_else(|| self.current_track().and_then(|t| t.duration))
    }

    pub fn shuffle(&self) -> bool {
        self.controller.shuffle()
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.controller.loop_mode()
    }

    pub fn volume(&self) -> u8 {
        self.controller.volume()
    }

    /// Latest equalizer frame, refreshed by [`Session::tick`].
    pub fn snapshot(&self) -> &EqualizerSnapshot {
        &self.snapshot
    }

    /// Probe and append a single audio file. Returns its index.
    pub fn add_path(&mut self, path: &Path) -> Result<usize> {
        let old = self.playlist.len();
        let index = self.playlist.add(path)?;
        self.controller.tracks_appended(old, self.playlist.len());
        Ok(index)
    }

    /// Add files, directories (scanned for audio) and M3U playlists, skipping
    /// paths already listed. Starts the first new track when nothing is
    /// current and autoplay is on.
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> AddReport {
        let old = self.playlist.len();
        let mut report = AddReport::default();

        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                for file in scan(path, self.playlist.settings()) {
                    self.add_unique(&file, &mut report);
                }
            } else if is_playlist_file(path) {
                self.import_unique(path, &mut report);
            } else {
                self.add_unique(path, &mut report);
            }
        }

        let new = self.playlist.len();
        if new > old {
            self.controller.tracks_appended(old, new);
            info!("added {} track(s), {} duplicate(s)", report.added, report.duplicates);
            if self.autoplay && self.controller.current().is_none() {
                if let Err(e) = self.controller.play(&self.playlist, old) {
                    report.errors.push(e);
                }
            }
        }
        report
    }

    /// Remove the track at `index`. Removing the playing track moves playback
    /// to the track that takes its slot; playback stops when none does.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        let was_playing =
            self.controller.current() == Some(index) && self.controller.state() == PlaybackState::Playing;
        let track = self.playlist.remove(index)?;
        self.controller.track_removed(index);
        debug!("removed {}", track.path.display());

        if was_playing {
            let next = if index < self.playlist.len() {
                Some(index)
            } else if self.controller.repeat() && !self.playlist.is_empty() {
                Some(0)
            } else {
                None
            };
            match next {
                Some(i) => self.controller.play(&self.playlist, i)?,
                None => self.sampler.clear(),
            }
        }
        Ok(track)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.playlist.reorder(from, to)?;
        self.controller.track_moved(from, to);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.controller.reset();
        self.playlist.clear();
        self.sampler.clear();
        info!("playlist cleared");
    }

    pub fn play(&mut self, index: usize) -> Result<()> {
        self.controller.play(&self.playlist, index)
    }

    /// Play/pause. From `Stopped`, replays the current track or starts `fallback`.
    pub fn toggle_play_pause(&mut self, fallback: usize) -> Result<()> {
        self.controller.toggle(&self.playlist, fallback)
    }

    pub fn next(&mut self) -> Result<()> {
        self.controller.next(&self.playlist)
    }

    pub fn previous(&mut self) -> Result<()> {
        self.controller.previous(&self.playlist)
    }

    pub fn stop(&mut self) {
        self.controller.stop();
    }

    pub fn seek_by(&mut self, delta_secs: i64) -> Result<()> {
        self.controller.seek_by(&self.playlist, delta_secs)
    }

    pub fn set_volume(&mut self, level: i32) -> u8 {
        self.controller.set_volume(level)
    }

    pub fn adjust_volume(&mut self, delta: i32) -> u8 {
        self.controller.adjust_volume(delta)
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.controller.set_shuffle(on, self.playlist.len());
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.controller.toggle_shuffle(self.playlist.len());
        self.controller.shuffle()
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.controller.set_loop_mode(mode);
    }

    pub fn cycle_loop_mode(&mut self) -> LoopMode {
        self.controller.cycle_loop_mode();
        self.controller.loop_mode()
    }

    /// Append the entries of an M3U file. Returns how many were added.
    pub fn import_playlist(&mut self, path: &Path) -> Result<usize> {
        let old = self.playlist.len();
        let added = self.playlist.import_m3u(path)?;
        self.controller.tracks_appended(old, self.playlist.len());
        Ok(added)
    }

    /// Replace the playlist with the contents of an M3U file. The current
    /// playlist is kept when the file cannot be read.
    pub fn load_playlist(&mut self, path: &Path) -> Result<usize> {
        let mut fresh = Playlist::new(self.playlist.settings().clone());
        let added = fresh.import_m3u(path)?;
        self.controller.reset();
        self.sampler.clear();
        self.playlist = fresh;
        Ok(added)
    }

    pub fn export_playlist(&self, path: &Path) -> Result<()> {
        self.playlist.export_m3u(path)
    }

    /// Advance playback by one tick and refresh the equalizer snapshot.
    pub fn tick(&mut self) -> Result<()> {
        let result = self.controller.tick(&self.playlist);

        if self.controller.started() != self.sampled_start {
            self.sampled_start = self.controller.started();
            match self.current_track().map(|t| t.path.clone()) {
                Some(path) => self.sampler.load(&path),
                None => self.sampler.clear(),
            }
        }
        self.snapshot = self
            .sampler
            .sample(self.controller.state(), self.controller.elapsed());
        result
    }

    fn add_unique(&mut self, path: &Path, report: &mut AddReport) {
        if !is_audio_file(path, self.playlist.settings()) {
            report.errors.push(PlayerError::unreadable(path, "unsupported format"));
            return;
        }
        if self.playlist.contains(path) {
            report.duplicates += 1;
            return;
        }
        match self.playlist.add(path) {
            Ok(_) => report.added += 1,
            Err(e) => {
                warn!("{e}");
                report.errors.push(e);
            }
        }
    }

    fn import_unique(&mut self, path: &Path, report: &mut AddReport) {
        let mut staged = Playlist::new(self.playlist.settings().clone());
        if let Err(e) = staged.import_m3u(path) {
            warn!("{e}");
            report.errors.push(e);
            return;
        }
        for track in staged.tracks() {
            if self.playlist.contains(&track.path) {
                report.duplicates += 1;
            } else {
                self.playlist.push(track.clone());
                report.added += 1;
            }
        }
    }
}
