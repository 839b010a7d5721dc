//! Turning file-system paths into [`Track`]s.
//!
//! `probe` reads a single file's tags and duration, `scan` walks a folder for
//! audio files.

mod display;
mod model;
mod probe;
mod scan;

pub use model::Track;
pub use probe::{is_audio_file, is_playlist_file, probe};
pub use scan::scan;
