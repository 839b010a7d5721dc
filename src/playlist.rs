//! The playlist store: an ordered list of tracks plus M3U import/export.

mod m3u;
mod store;

pub use store::Playlist;
