//! Application module: the state the TUI renders and the key handler mutates.
//!
//! `App` wraps the [`Session`](crate::session::Session) with the cursor, the
//! follow-playback flag and the status line.

mod model;

pub use model::*;
