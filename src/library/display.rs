use std::path::Path;

use crate::config::TrackDisplayField;

/// Trimmed, non-empty text or nothing.
fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Compose a track's display title from `fields`, in order, joined by `sep`.
///
/// Fields the track has no value for are skipped; when none produce
/// anything the plain `title` is used.
pub fn title_from_fields(
    path: &Path,
    title: &str,
    artist: Option<&str>,
    album: Option<&str>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let parts: Vec<String> = fields
        .iter()
        .filter_map(|field| match field {
            TrackDisplayField::Title => non_blank(title),
            TrackDisplayField::Artist => artist.and_then(non_blank),
            TrackDisplayField::Album => album.and_then(non_blank),
            TrackDisplayField::Filename => path.file_stem().and_then(|s| s.to_str()).and_then(non_blank),
            TrackDisplayField::Path => Some(path.display().to_string()),
        })
        .collect();

    if parts.is_empty() {
        title.to_string()
    } else {
        parts.join(sep)
    }
}
