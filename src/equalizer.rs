//! Live equalizer: band levels computed from the decoded audio around the
//! current playback position.

mod analyzer;
mod pcm;
mod sampler;

pub use analyzer::{FftAnalyzer, SpectrumAnalyzer, band_edges};
pub use pcm::PcmBuffer;
pub use sampler::{EqualizerSampler, EqualizerSnapshot};
