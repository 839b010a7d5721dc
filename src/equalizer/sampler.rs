use std::path::Path;
use std::time::Duration;

use log::{debug, warn};

use crate::audio::PlaybackState;
use crate::config::EqualizerSettings;

use super::analyzer::{FftAnalyzer, SpectrumAnalyzer};
use super::pcm::PcmBuffer;

/// Band levels for one frame of the visualization, each in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EqualizerSnapshot {
    pub levels: Vec<f32>,
}

impl EqualizerSnapshot {
    pub fn idle(bands: usize) -> Self {
        Self {
            levels: vec![0.0; bands],
        }
    }

    pub fn is_silent(&self) -> bool {
        self.levels.iter().all(|&l| l == 0.0)
    }
}

pub struct EqualizerSampler {
    analyzer: Box<dyn SpectrumAnalyzer>,
    pcm: Option<PcmBuffer>,
    levels: Vec<f32>,
    window: Duration,
    smoothing: f32,
}

impl EqualizerSampler {
    pub fn new(settings: &EqualizerSettings) -> Self {
        Self::with_analyzer(Box::new(FftAnalyzer::new(settings)), settings)
    }

    pub fn with_analyzer(analyzer: Box<dyn SpectrumAnalyzer>, settings: &EqualizerSettings) -> Self {
        let bands = analyzer.bands();
        Self {
            analyzer,
            pcm: None,
            levels: vec![0.0; bands],
            window: Duration::from_millis(settings.window_ms.max(1)),
            smoothing: settings.smoothing.clamp(f32::EPSILON, 1.0),
        }
    }

    pub fn bands(&self) -> usize {
        self.levels.len()
    }

    pub fn has_data(&self) -> bool {
        self.pcm.is_some()
    }

    /// Decode `path` for analysis. On failure the sampler idles until the next load.
    pub fn load(&mut self, path: &Path) {
        self.clear();
        match PcmBuffer::decode(path) {
            Ok(pcm) => {
                debug!(
                    "equalizer: {} samples at {} Hz from {}",
                    pcm.len(),
                    pcm.rate(),
                    path.display()
                );
                self.pcm = Some(pcm);
            }
            Err(e) => warn!("equalizer: cannot decode {}: {e}", path.display()),
        }
    }

    pub fn set_pcm(&mut self, pcm: PcmBuffer) {
        self.pcm = Some(pcm);
    }

    pub fn clear(&mut self) {
        self.pcm = None;
        self.levels.iter_mut().for_each(|l| *l = 0.0);
    }

    /// Levels for `position`, smoothed against the previous call.
    pub fn sample(&mut self, state: PlaybackState, position: Duration) -> EqualizerSnapshot {
        if state != PlaybackState::Playing {
            self.levels.iter_mut().for_each(|l| *l = 0.0);
            return EqualizerSnapshot::idle(self.bands());
        }

        let targets = match &self.pcm {
            Some(pcm) => match pcm.window_at(position, self.window) {
                Some(window) => self.analyzer.analyze(window, pcm.rate()),
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        let a = self.smoothing;
        for (i, level) in self.levels.iter_mut().enumerate() {
            let target = targets.get(i).copied().unwrap_or(0.0).clamp(0.0, 1.0);
            *level = ((1.0 - a) * *level + a * target).clamp(0.0, 1.0);
        }
        EqualizerSnapshot {
            levels: self.levels.clone(),
        }
    }
}
