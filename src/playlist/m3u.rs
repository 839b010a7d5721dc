//! Extended M3U reading and writing.
//!
//! ```text
//! #EXTM3U
//! #EXTINF:215,Artist - Title
//! /music/song.mp3
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::library::Track;

const EXTINF: &str = "#EXTINF:";

/// One path line plus whatever the preceding `#EXTINF` line said about it.
#[derive(Debug, Clone, PartialEq)]
pub struct M3uEntry {
    pub path: PathBuf,
    pub title: Option<String>,
    pub duration: Option<Duration>,
}

#[derive(Debug, Default)]
struct ExtInf {
    title: Option<String>,
    duration: Option<Duration>,
}

fn parse_extinf(rest: &str) -> ExtInf {
    let (dur_part, title_part) = match rest.split_once(',') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    // Attributes may follow the duration: `#EXTINF:123 tvg-id="x",Title`.
    let duration = dur_part
        .split_whitespace()
        .next()
        .and_then(|d| d.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

    let title = title_part
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    ExtInf { title, duration }
}

/// Parse playlist text. Relative paths are joined onto `base_dir`.
///
/// Comment and directive lines other than `#EXTINF` are ignored, as are blank
/// lines. An `#EXTINF` line only applies to the next path line.
pub fn parse(text: &str, base_dir: &Path) -> Vec<M3uEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<ExtInf> = None;

    for raw in text.lines() {
        let line = raw.trim().trim_start_matches('\u{feff}');
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(EXTINF) {
            pending = Some(parse_extinf(rest));
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let p = PathBuf::from(line);
        let path = if p.is_absolute() { p } else { base_dir.join(p) };
        let info = pending.take().unwrap_or_default();
        entries.push(M3uEntry {
            path,
            title: info.title,
            duration: info.duration,
        });
    }

    entries
}

/// Render `tracks` as extended M3U. Unknown durations are written as `-1`.
pub fn render(tracks: &[Track]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for t in tracks {
        let secs = t
            .duration
            .map(|d| d.as_secs_f64().round() as i64)
            .unwrap_or(-1);
        let title = t.title.replace(['\r', '\n'], " ");
        let _ = writeln!(out, "{EXTINF}{secs},{title}");
        let _ = writeln!(out, "{}", t.path.display());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pairs_extinf_with_the_next_path() {
        let text = "#EXTM3U\n#EXTINF:215,Artist - Song\n/music/a.mp3\n/music/b.mp3\n";
        let entries = parse(text, Path::new("/lists"));
        assert_eq!(
            entries,
            vec![
                M3uEntry {
                    path: "/music/a.mp3".into(),
                    title: Some("Artist - Song".into()),
                    duration: Some(Duration::from_secs(215)),
                },
                M3uEntry {
                    path: "/music/b.mp3".into(),
                    title: None,
                    duration: None,
                },
            ]
        );
    }

    #[test]
    fn parse_resolves_relative_paths_and_skips_comments() {
        let text = "# a comment\n\n  sub/c.ogg  \r\n#EXTVLCOPT:foo\n";
        let entries = parse(text, Path::new("/lists"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, PathBuf::from("/lists/sub/c.ogg"));
    }

    #[test]
    fn parse_tolerates_bad_extinf_values() {
        let text = "#EXTINF:abc,Kept Title\n/a.mp3\n#EXTINF:-1,\n/b.mp3\n#EXTINF:12\n/c.mp3\n";
        let entries = parse(text, Path::new("/"));
        assert_eq!(entries[0].title.as_deref(), Some("Kept Title"));
        assert_eq!(entries[0].duration, None);
        assert_eq!(entries[1].title, None);
        assert_eq!(entries[1].duration, None);
        assert_eq!(entries[2].title, None);
        assert_eq!(entries[2].duration, Some(Duration::from_secs(12)));
    }

    #[test]
    fn parse_ignores_durations_out_of_range() {
        let text = "#EXTINF:1e20,Huge\n/a.mp3\n#EXTINF:NaN,Odd\n/b.mp3\n#EXTINF:inf,Endless\n/c.mp3\n";
        let entries = parse(text, Path::new("/"));
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.duration.is_none()));
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_deref()).collect();
        assert_eq!(titles, vec![Some("Huge"), Some("Odd"), Some("Endless")]);
    }

    #[test]
    fn parse_accepts_extinf_attributes() {
        let text = "#EXTINF:30 tvg-id=\"x\",Radio\n/r.mp3\n";
        let entries = parse(text, Path::new("/"));
        assert_eq!(entries[0].duration, Some(Duration::from_secs(30)));
        assert_eq!(entries[0].title.as_deref(), Some("Radio"));
    }

    #[test]
    fn render_writes_header_extinf_and_paths_in_order() {
        let mut a = Track::bare("/m/a.mp3".into());
        a.title = "First".into();
        a.duration = Some(Duration::from_millis(61_600));
        let b = Track::bare("/m/b.mp3".into());

        let out = render(&[a, b]);
        assert_eq!(
            out,
            "#EXTM3U\n#EXTINF:62,First\n/m/a.mp3\n#EXTINF:-1,b\n/m/b.mp3\n"
        );
    }
}
