use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, Source};

use crate::audio::BackendError;

use super::analyzer::MIN_WINDOW;

/// Analysis never needs more than this; faster files are resampled down.
pub(crate) const MAX_ANALYSIS_RATE: u32 = 44_100;

/// A whole track decoded to mono `f32` samples for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    rate: u32,
    samples: Vec<f32>,
}

impl PcmBuffer {
    /// Decode `path` completely, averaging interleaved channels down to mono
    /// and capping the rate at [`MAX_ANALYSIS_RATE`].
    pub fn decode(path: &Path) -> Result<Self, BackendError> {
        let file = File::open(path)?;
        let decoder = Decoder::new(BufReader::new(file))?;
        let rate = decoder.sample_rate();
        let channels = usize::from(decoder.channels().max(1));

        let mut mono = Vec::new();
        let mut acc = 0.0f32;
        let mut filled = 0usize;
        for sample in decoder {
            acc += sample;
            filled += 1;
            if filled == channels {
                mono.push(acc / channels as f32);
                acc = 0.0;
                filled = 0;
            }
        }
        Ok(Self::from_samples(rate, mono).capped(MAX_ANALYSIS_RATE))
    }

    /// Linearly resample down to `max_rate` when the buffer is faster.
    pub(crate) fn capped(self, max_rate: u32) -> Self {
        if self.rate <= max_rate || max_rate == 0 {
            return self;
        }
        let ratio = f64::from(self.rate) / f64::from(max_rate);
        let out_len = (self.samples.len() as f64 / ratio) as usize;
        let src = &self.samples;
        let samples = (0..out_len)
            .map(|i| {
                let pos = i as f64 * ratio;
                let idx = pos as usize;
                let frac = (pos - idx as f64) as f32;
                match (src.get(idx), src.get(idx + 1)) {
                    (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
                    (Some(a), None) => *a,
                    _ => 0.0,
                }
            })
            .collect();
        Self {
            rate: max_rate,
            samples,
        }
    }

    pub fn from_samples(rate: u32, samples: Vec<f32>) -> Self {
        Self { rate, samples }
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `window` worth of samples starting half a window before `position`
    /// (clamped at the start of the track), truncated at the end.
    ///
    /// `None` when the window starts past the end or is too short to analyze.
    pub fn window_at(&self, position: Duration, window: Duration) -> Option<&[f32]> {
        let start_ms = position.as_millis().saturating_sub(window.as_millis() / 2);
        let end_ms = start_ms + window.as_millis();
        let rate = u128::from(self.rate);
        let start = usize::try_from(start_ms * rate / 1000).ok()?;
        let end = usize::try_from(end_ms * rate / 1000)
            .unwrap_or(usize::MAX)
            .min(self.samples.len());
        if start >= self.samples.len() || end - start < MIN_WINDOW {
            return None;
        }
        Some(&self.samples[start..end])
    }
}
