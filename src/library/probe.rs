use std::fs::{self, File};
use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;

use crate::config::LibrarySettings;
use crate::error::{PlayerError, Result};

use super::display::title_from_fields;
use super::model::{Track, file_stem, format_tag};

/// True when `path` has one of the configured audio extensions.
pub fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let ext = format_tag(path);
    if ext.is_empty() {
        return false;
    }
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .any(|e| e == ext)
}

/// True for `.m3u` / `.m3u8` files.
pub fn is_playlist_file(path: &Path) -> bool {
    matches!(format_tag(path).as_str(), "m3u" | "m3u8")
}

/// Probe the file at `path` and build a [`Track`] from its tags and properties.
///
/// Fails with [`PlayerError::UnreadableFile`] when the extension is not a
/// configured audio format, the file cannot be opened, or its contents cannot
/// be parsed.
pub fn probe(path: &Path, settings: &LibrarySettings) -> Result<Track> {
    if !is_audio_file(path, settings) {
        return Err(PlayerError::unreadable(path, "unsupported format"));
    }

    let path = fs::canonicalize(path).map_err(|e| PlayerError::unreadable(path, e))?;
    File::open(&path).map_err(|e| PlayerError::unreadable(&path, e))?;
    let tagged = lofty::read_from_path(&path).map_err(|e| PlayerError::unreadable(&path, e))?;

    let mut title = file_stem(&path);
    let mut artist: Option<String> = None;
    let mut album: Option<String> = None;
    let duration = Some(tagged.properties().duration());

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(v) = tag.title() {
            if !v.trim().is_empty() {
                title = v.trim().to_string();
            }
        }
        artist = tag
            .artist()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        album = tag
            .album()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
    }

    let display = title_from_fields(
        &path,
        &title,
        artist.as_deref(),
        album.as_deref(),
        &settings.title_fields,
        &settings.title_separator,
    );

    let format = format_tag(&path);
    Ok(Track {
        path,
        title: display,
        artist,
        album,
        duration,
        format,
    })
}
