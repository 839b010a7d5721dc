use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::config::EqualizerSettings;

/// Windows shorter than this are not analyzed.
pub(crate) const MIN_WINDOW: usize = 16;

const EPS: f32 = 1e-9;
const BASS_WEIGHT: f32 = 1.2;
const TREBLE_WEIGHT: f32 = 0.9;

/// Turns a window of mono samples into per-band levels in `[0, 1]`.
pub trait SpectrumAnalyzer {
    fn analyze(&mut self, window: &[f32], sample_rate: u32) -> Vec<f32>;
    fn bands(&self) -> usize;
}

/// `bands + 1` log-spaced edges from `min_hz` to `max_hz`.
pub fn band_edges(min_hz: f32, max_hz: f32, bands: usize) -> Vec<f32> {
    let (lo, hi) = (min_hz.ln(), max_hz.ln());
    (0..=bands)
        .map(|i| (lo + (hi - lo) * i as f32 / bands as f32).exp())
        .collect()
}

pub struct FftAnalyzer {
    bands: usize,
    min_hz: f32,
    max_hz: f32,
    planner: FftPlanner<f32>,
    /// Planned transform and its size.
    fft: Option<(usize, Arc<dyn Fft<f32>>)>,
    /// Hann coefficients for the last window length seen.
    hann: Vec<f32>,
}

impl FftAnalyzer {
    pub fn new(settings: &EqualizerSettings) -> Self {
        Self {
            bands: settings.bands.max(1),
            min_hz: settings.min_hz,
            max_hz: settings.max_hz,
            planner: FftPlanner::new(),
            fft: None,
            hann: Vec::new(),
        }
    }

    /// RMS of the FFT magnitudes falling in each band, before any scaling.
    pub(crate) fn band_energies(&mut self, window: &[f32], sample_rate: u32) -> Vec<f32> {
        let n = window.len();
        let nyquist = sample_rate as f32 / 2.0;
        let top = self.max_hz.min(nyquist);
        if n < MIN_WINDOW || sample_rate == 0 || top <= self.min_hz {
            return vec![0.0; self.bands];
        }

        if self.hann.len() != n {
            let denom = (n - 1) as f32;
            self.hann = (0..n)
                .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
                .collect();
        }

        let fft_size = n.next_power_of_two();
        let fft = match &self.fft {
            Some((size, f)) if *size == fft_size => f.clone(),
            _ => {
                let f = self.planner.plan_fft_forward(fft_size);
                self.fft = Some((fft_size, f.clone()));
                f
            }
        };

        let mut buf: Vec<Complex<f32>> = window
            .iter()
            .zip(&self.hann)
            .map(|(s, w)| Complex::new(s * w, 0.0))
            .collect();
        buf.resize(fft_size, Complex::new(0.0, 0.0));
        fft.process(&mut buf);

        let bin_hz = sample_rate as f32 / fft_size as f32;
        let edges = band_edges(self.min_hz, top, self.bands);
        let mut sums = vec![0.0f32; self.bands];
        let mut counts = vec![0usize; self.bands];

        // Positive frequencies only: bins 0..=fft_size/2.
        for (k, c) in buf.iter().take(fft_size / 2 + 1).enumerate() {
            let freq = k as f32 * bin_hz;
            if freq < edges[0] || freq >= edges[self.bands] {
                continue;
            }
            let band = edges[1..].partition_point(|&e| e <= freq);
            let band = band.min(self.bands - 1);
            sums[band] += c.norm_sqr();
            counts[band] += 1;
        }

        sums.iter()
            .zip(&counts)
            .map(|(&s, &c)| if c == 0 { 0.0 } else { (s / c as f32).sqrt() })
            .collect()
    }
}

impl SpectrumAnalyzer for FftAnalyzer {
    fn analyze(&mut self, window: &[f32], sample_rate: u32) -> Vec<f32> {
        if window.len() < MIN_WINDOW {
            return vec![0.0; self.bands];
        }
        let logs: Vec<f32> = self
            .band_energies(window, sample_rate)
            .into_iter()
            .map(|v| (v + EPS).log10())
            .collect();

        let min = logs.iter().copied().fold(f32::INFINITY, f32::min);
        let max = logs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let range = (max - min).max(1e-6);

        let last = (self.bands.max(2) - 1) as f32;
        logs.iter()
            .enumerate()
            .map(|(i, v)| {
                let weight = BASS_WEIGHT + (TREBLE_WEIGHT - BASS_WEIGHT) * i as f32 / last;
                ((v - min) / range * weight).clamp(0.0, 1.0)
            })
            .collect()
    }

    fn bands(&self) -> usize {
        self.bands
    }
}
