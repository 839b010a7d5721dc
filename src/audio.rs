//! Playback: the backend seam, its rodio implementation and the controller
//! state machine on top.

mod backend;
mod controller;
mod queue;
mod rodio_backend;
mod types;

pub use backend::{BackendError, PlaybackBackend};
pub use controller::PlaybackController;
pub use rodio_backend::RodioBackend;
pub use types::{LoopMode, PlaybackState};

#[cfg(test)]
pub(crate) mod tests;
