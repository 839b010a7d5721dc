//! [`PlaybackBackend`] on top of `rodio`.
//!
//! One `Sink` per open track; rodio's mixer thread does the actual output.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::backend::{BackendError, PlaybackBackend};

pub struct RodioBackend {
    stream: OutputStream,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    duration: Option<Duration>,
    /// Added to the sink's position after a seek that had to reopen the file.
    offset: Duration,
    volume: f32,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, BackendError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            path: None,
            duration: None,
            offset: Duration::ZERO,
            volume: 1.0,
        })
    }

    /// Create a paused `Sink` for `path` that starts playback at `start_at`.
    fn create_sink_at(&self, path: &Path, start_at: Duration) -> Result<Sink, BackendError> {
        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))?
            // `skip_duration` is the fallback seeking primitive; even Duration::ZERO is fine.
            .skip_duration(start_at);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        Ok(sink)
    }

    fn reopen_at(&mut self, position: Duration) -> Result<(), BackendError> {
        let path = self.path.clone().ok_or(BackendError::NotOpen)?;
        let was_paused = self.sink.as_ref().is_none_or(|s| s.is_paused());

        let sink = self.create_sink_at(&path, position)?;
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        if !was_paused {
            sink.play();
        }
        self.sink = Some(sink);
        self.offset = position;
        Ok(())
    }
}

impl PlaybackBackend for RodioBackend {
    fn open(&mut self, path: &Path) -> Result<(), BackendError> {
        self.stop();

        let file = File::open(path)?;
        let probe = Decoder::new(BufReader::new(file))?;
        self.duration = probe.total_duration();
        drop(probe);

        self.sink = Some(self.create_sink_at(path, Duration::ZERO)?);
        self.path = Some(path.to_path_buf());
        self.offset = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) {
        if let Some(s) = &self.sink {
            s.play();
        }
    }

    fn pause(&mut self) {
        if let Some(s) = &self.sink {
            s.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.path = None;
        self.duration = None;
        self.offset = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        let sink = self.sink.as_ref().ok_or(BackendError::NotOpen)?;
        match sink.try_seek(position) {
            Ok(()) => {
                self.offset = Duration::ZERO;
                Ok(())
            }
            Err(e) => {
                // Not every decoder can seek; rebuild the sink and skip into the file.
                debug!("try_seek failed ({e}); reopening at {position:?}");
                self.reopen_at(position)
            }
        }
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map_or(Duration::ZERO, |s| self.offset + s.get_pos())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_volume(&mut self, level: u8) {
        self.volume = f32::from(level.min(100)) / 100.0;
        if let Some(s) = &self.sink {
            s.set_volume(self.volume);
        }
    }

    fn is_drained(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.empty())
    }
}
