//! Application model: `App` and its status line.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::audio::PlaybackState;
use crate::error::{PlayerError, Result};
use crate::session::Session;

/// The message shown under the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// The main application model.
pub struct App {
    pub session: Session,
    pub selected: usize,
    /// Cursor jumps to the playing track while set.
    pub follow_playback: bool,
    /// Where `w` writes and `o` reads the playlist.
    pub playlist_path: PathBuf,
    status: Option<StatusLine>,
}

impl App {
    pub fn new(session: Session, playlist_path: PathBuf) -> Self {
        Self {
            session,
            selected: 0,
            follow_playback: true,
            playlist_path,
            status: None,
        }
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    /// Show `err` to the user and log it.
    pub fn set_error(&mut self, err: &PlayerError) {
        warn!("{err}");
        self.status = Some(StatusLine {
            text: err.to_string(),
            is_error: true,
        });
    }

    /// Keep the status line in sync with the outcome of a command.
    fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            self.set_error(&e);
        }
    }

    pub fn has_tracks(&self) -> bool {
        !self.session.playlist().is_empty()
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Set the cursor, clamped to the playlist.
    pub fn set_selected(&mut self, idx: usize) {
        let len = self.session.playlist().len();
        self.selected = if len == 0 { 0 } else { idx.min(len - 1) };
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.session.playlist().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.session.playlist().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.set_selected(0);
    }

    pub fn select_last(&mut self) {
        self.set_selected(usize::MAX);
    }

    /// Follow the playing track if enabled and keep the cursor in range.
    pub fn sync_selection(&mut self) {
        if self.follow_playback {
            if let Some(current) = self.session.current() {
                self.selected = current;
            }
        }
        self.set_selected(self.selected);
    }

    /// Advance playback one tick.
    pub fn tick(&mut self) {
        let result = self.session.tick();
        self.report(result);
        self.sync_selection();
    }

    pub fn play_selected(&mut self) {
        if !self.has_tracks() {
            return;
        }
        let playing_selected = self.session.state() == PlaybackState::Playing
            && self.session.current() == Some(self.selected);
        if !playing_selected {
            self.follow_playback_on();
            let result = self.session.play(self.selected);
            self.report(result);
        }
    }

    pub fn toggle_play_pause(&mut self) {
        self.follow_playback_on();
        let result = self.session.toggle_play_pause(self.selected);
        self.report(result);
    }

    pub fn next_track(&mut self) {
        if self.has_tracks() {
            self.follow_playback_on();
            let result = self.session.next();
            self.report(result);
            self.sync_selection();
        }
    }

    pub fn prev_track(&mut self) {
        if self.has_tracks() {
            self.follow_playback_on();
            let result = self.session.previous();
            self.report(result);
            self.sync_selection();
        }
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    pub fn seek_by(&mut self, delta_secs: i64) {
        let result = self.session.seek_by(delta_secs);
        self.report(result);
    }

    pub fn change_volume(&mut self, delta: i32) {
        let level = self.session.adjust_volume(delta);
        self.set_status(format!("volume {level}%"));
    }

    pub fn toggle_shuffle(&mut self) {
        let on = self.session.toggle_shuffle();
        self.set_status(if on { "shuffle on" } else { "shuffle off" });
    }

    pub fn cycle_loop_mode(&mut self) {
        let mode = self.session.cycle_loop_mode();
        self.set_status(format!("loop mode: {}", mode.label()));
    }

    /// Move the selected track one slot up (`-1`) or down (`+1`); the cursor follows it.
    pub fn move_selected(&mut self, delta: isize) {
        let len = self.session.playlist().len();
        let Some(to) = self.selected.checked_add_signed(delta).filter(|&t| t < len) else {
            return;
        };
        let result = self.session.reorder(self.selected, to);
        if result.is_ok() {
            self.selected = to;
        }
        self.report(result);
    }

    pub fn remove_selected(&mut self) {
        if !self.has_tracks() {
            return;
        }
        match self.session.remove(self.selected) {
            Ok(track) => {
                self.set_status(format!("removed {}", track.title));
                self.sync_selection();
            }
            Err(e) => self.set_error(&e),
        }
    }

    pub fn clear_playlist(&mut self) {
        self.session.clear();
        self.selected = 0;
        self.set_status("playlist cleared");
    }

    /// Add files, folders or playlists given on the command line or dropped onto the terminal.
    pub fn add_paths(&mut self, paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }
        let report = self.session.add_paths(paths);
        for e in &report.errors {
            warn!("{e}");
        }
        self.status = Some(StatusLine {
            text: report.summary(),
            is_error: report.added == 0 && !report.errors.is_empty(),
        });
        self.sync_selection();
    }

    pub fn export_playlist(&mut self) {
        let path = self.playlist_path.clone();
        match self.session.export_playlist(&path) {
            Ok(()) => self.set_status(format!("saved to {}", path.display())),
            Err(e) => self.set_error(&e),
        }
    }

    /// Replace the playlist with the contents of `playlist_path`.
    pub fn reload_playlist(&mut self) {
        let path = self.playlist_path.clone();
        self.load_from(&path);
    }

    pub fn load_from(&mut self, path: &Path) {
        match self.session.load_playlist(path) {
            Ok(n) => {
                info!("loaded {n} tracks from {}", path.display());
                self.selected = 0;
                self.set_status(format!("loaded {n} track(s) from {}", path.display()));
            }
            Err(e) => self.set_error(&e),
        }
    }
}
