//! The playback state machine.
//!
//! `Stopped -> Playing (play) -> Paused (pause) -> Playing (resume)`, and back
//! to `Stopped` on `stop` or when the playlist runs out with looping off.
//! The controller never reads the playlist on its own; every operation that
//! needs it takes it as an argument, and the session reports playlist edits
//! through the `track_*` hooks.

use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{PlayerError, Result};
use crate::playlist::Playlist;

use super::backend::PlaybackBackend;
use super::queue;
use super::types::{LoopMode, PlaybackState};

pub struct PlaybackController {
    backend: Box<dyn PlaybackBackend>,
    state: PlaybackState,
    current: Option<usize>,
    elapsed: Duration,
    shuffle: bool,
    loop_mode: LoopMode,
    volume: u8,
    /// Shuffle cycle; empty while shuffle is off.
    order: Vec<usize>,
    order_pos: Option<usize>,
    rng: StdRng,
    /// Bumped every time a track starts, so observers can notice track changes.
    started: u64,
}

impl PlaybackController {
    pub fn new(mut backend: Box<dyn PlaybackBackend>, volume: u8) -> Self {
        let volume = volume.min(100);
        backend.set_volume(volume);
        Self {
            backend,
            state: PlaybackState::Stopped,
            current: None,
            elapsed: Duration::ZERO,
            shuffle: false,
            loop_mode: LoopMode::default(),
            volume,
            order: Vec::new(),
            order_pos: None,
            rng: StdRng::from_os_rng(),
            started: 0,
        }
    }

    /// Replace the shuffle RNG with a seeded one.
    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Length of the open track as reported by the backend.
    pub fn duration(&self) -> Option<Duration> {
        if self.state == PlaybackState::Stopped {
            None
        } else {
            self.backend.duration()
        }
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn repeat(&self) -> bool {
        self.loop_mode.wraps()
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn started(&self) -> u64 {
        self.started
    }

    /// Start the track at `index` from the beginning.
    pub fn play(&mut self, playlist: &Playlist, index: usize) -> Result<()> {
        PlayerError::check_index(index, playlist.len())?;
        if self.shuffle {
            self.ensure_order(playlist.len());
            self.order_pos = queue::promote(&mut self.order, self.order_pos, index);
        }
        self.start(playlist, index)
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.backend.pause();
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.backend.play();
            self.state = PlaybackState::Playing;
        }
    }

    /// Play/pause toggle. From `Stopped` this restarts the current track, or
    /// `fallback` when there is none.
    pub fn toggle(&mut self, playlist: &Playlist, fallback: usize) -> Result<()> {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Stopped => {
                if playlist.is_empty() {
                    return Ok(());
                }
                let index = self
                    .current
                    .filter(|&i| i < playlist.len())
                    .unwrap_or(fallback);
                self.play(playlist, index)?;
            }
        }
        Ok(())
    }

    /// Stop output. The current index is kept so play can pick up from it.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Stopped {
            debug!("stopping playback");
        }
        self.backend.stop();
        self.state = PlaybackState::Stopped;
        self.elapsed = Duration::ZERO;
    }

    /// Jump to `position` in the open track, clamped to its length.
    pub fn seek(&mut self, playlist: &Playlist, position: Duration) -> Result<()> {
        if self.state == PlaybackState::Stopped {
            return Ok(());
        }
        let position = match self.backend.duration() {
            Some(d) => position.min(d),
            None => position,
        };
        self.backend.seek(position).map_err(|e| {
            let path = self
                .current
                .and_then(|i| playlist.get(i))
                .map(|t| t.path.clone())
                .unwrap_or_default();
            PlayerError::Playback {
                path,
                reason: e.to_string(),
            }
        })?;
        self.elapsed = position;
        Ok(())
    }

    /// Seek relative to the current position by `delta_secs` (may be negative).
    pub fn seek_by(&mut self, playlist: &Playlist, delta_secs: i64) -> Result<()> {
        let target = (self.elapsed.as_secs_f64() + delta_secs as f64).max(0.0);
        self.seek(playlist, Duration::from_secs_f64(target))
    }

    /// Advance to the next track, or stop when there is none and looping is off.
    pub fn next(&mut self, playlist: &Playlist) -> Result<()> {
        let len = playlist.len();
        if len == 0 {
            self.stop();
            return Ok(());
        }
        let target = if self.shuffle {
            self.next_shuffled(len)
        } else {
            match self.current {
                None => Some(0),
                Some(i) if i + 1 < len => Some(i + 1),
                Some(_) if self.loop_mode.wraps() => Some(0),
                Some(_) => None,
            }
        };
        self.start_or_stop(playlist, target)
    }

    /// Go back one track, or stop when at the start and looping is off.
    pub fn previous(&mut self, playlist: &Playlist) -> Result<()> {
        let len = playlist.len();
        if len == 0 {
            self.stop();
            return Ok(());
        }
        let target = if self.shuffle {
            self.ensure_order(len);
            // Never move past unplayed entries at the start of a cycle.
            let pos = match self.order_pos {
                None => Some(0),
                Some(p) if p > 0 => Some(p - 1),
                Some(p) if self.loop_mode.wraps() => Some(p),
                Some(_) => None,
            };
            self.order_pos = pos.or(self.order_pos);
            pos.map(|p| self.order[p])
        } else {
            match self.current {
                None => Some(0),
                Some(i) if i > 0 => Some(i - 1),
                Some(_) if self.loop_mode.wraps() => Some(len - 1),
                Some(_) => None,
            }
        };
        self.start_or_stop(playlist, target)
    }

    /// Clamp `level` to 0..=100 and apply it. Returns the applied level.
    pub fn set_volume(&mut self, level: i32) -> u8 {
        let level = level.clamp(0, 100) as u8;
        self.volume = level;
        self.backend.set_volume(level);
        level
    }

    pub fn adjust_volume(&mut self, delta: i32) -> u8 {
        self.set_volume(i32::from(self.volume) + delta)
    }

    pub fn set_shuffle(&mut self, on: bool, len: usize) {
        if on == self.shuffle {
            return;
        }
        self.shuffle = on;
        self.order.clear();
        self.order_pos = None;
        if on {
            self.ensure_order(len);
        }
    }

    pub fn toggle_shuffle(&mut self, len: usize) {
        self.set_shuffle(!self.shuffle, len);
    }

    pub fn set_repeat(&mut self, on: bool) {
        self.loop_mode = if on { LoopMode::LoopAll } else { LoopMode::NoLoop };
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn cycle_loop_mode(&mut self) {
        self.loop_mode = self.loop_mode.cycle();
    }

    /// Poll the backend: refresh `elapsed` and advance when the track has ended.
    pub fn tick(&mut self, playlist: &Playlist) -> Result<()> {
        if self.state == PlaybackState::Stopped {
            return Ok(());
        }
        self.elapsed = self.backend.position();
        if self.state != PlaybackState::Playing {
            return Ok(());
        }

        let ended = self.backend.is_drained()
            || self.backend.duration().is_some_and(|d| self.elapsed >= d);
        if !ended {
            return Ok(());
        }

        debug!("end of track {:?}", self.current);
        match (self.loop_mode, self.current) {
            (LoopMode::LoopOne, Some(i)) if i < playlist.len() => self.start(playlist, i),
            _ => self.next(playlist),
        }
    }

    /// The track at `index` was removed from the playlist.
    pub fn track_removed(&mut self, index: usize) {
        match self.current {
            Some(c) if c == index => {
                self.stop();
                self.current = None;
            }
            Some(c) if c > index => self.current = Some(c - 1),
            _ => {}
        }
        if self.shuffle {
            queue::remove_index(&mut self.order, &mut self.order_pos, index);
        }
    }

    /// The playlist moved the track at `from` to `to`.
    pub fn track_moved(&mut self, from: usize, to: usize) {
        self.current = self.current.map(|c| queue::remap_moved(c, from, to));
        if self.shuffle {
            queue::apply_move(&mut self.order, from, to);
        }
    }

    /// Tracks `old_len..new_len` were appended to the playlist.
    pub fn tracks_appended(&mut self, old_len: usize, new_len: usize) {
        if self.shuffle && !self.order.is_empty() {
            queue::insert_unplayed(&mut self.order, self.order_pos, old_len..new_len, &mut self.rng);
        } else if self.shuffle {
            self.ensure_order(new_len);
        }
    }

    /// The playlist was cleared or replaced.
    pub fn reset(&mut self) {
        self.stop();
        self.current = None;
        self.order.clear();
        self.order_pos = None;
    }

    fn next_shuffled(&mut self, len: usize) -> Option<usize> {
        self.ensure_order(len);
        let next_pos = self.order_pos.map_or(0, |p| p + 1);
        if next_pos < self.order.len() {
            self.order_pos = Some(next_pos);
            return Some(self.order[next_pos]);
        }
        if !self.loop_mode.wraps() {
            return None;
        }

        // Every track has played once: start a new cycle, avoiding an
        // immediate repeat of the track that just finished.
        self.order = queue::shuffled_order(len, None, &mut self.rng);
        if len > 1 && Some(self.order[0]) == self.current {
            self.order.swap(0, 1);
        }
        self.order_pos = Some(0);
        Some(self.order[0])
    }

    fn ensure_order(&mut self, len: usize) {
        if self.order.len() != len {
            let first = self.current.filter(|&c| c < len);
            self.order = queue::shuffled_order(len, first, &mut self.rng);
            self.order_pos = first.map(|_| 0);
        }
    }

    fn start_or_stop(&mut self, playlist: &Playlist, target: Option<usize>) -> Result<()> {
        match target {
            Some(i) => self.start(playlist, i),
            None => {
                info!("end of playlist");
                self.stop();
                Ok(())
            }
        }
    }

    fn start(&mut self, playlist: &Playlist, index: usize) -> Result<()> {
        let track = playlist.get(index).ok_or(PlayerError::IndexOutOfRange {
            index,
            len: playlist.len(),
        })?;

        self.current = Some(index);
        self.elapsed = Duration::ZERO;
        if let Err(e) = self.backend.open(&track.path) {
            warn!("cannot open {}: {e}", track.path.display());
            self.backend.stop();
            self.state = PlaybackState::Stopped;
            return Err(PlayerError::Playback {
                path: track.path.clone(),
                reason: e.to_string(),
            });
        }

        self.backend.set_volume(self.volume);
        self.backend.play();
        self.state = PlaybackState::Playing;
        self.started += 1;
        info!("playing {}", track.path.display());
        Ok(())
    }
}
