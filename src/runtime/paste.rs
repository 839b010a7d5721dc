//! Turning pasted text into file paths.
//!
//! Terminals deliver files dropped onto them as a bracketed paste. Depending
//! on the terminal that text is a shell-quoted list, backslash-escaped
//! paths, or `file://` URLs one per line.

use std::path::{Path, PathBuf};

/// Split pasted text into the paths it names.
pub fn parse_paths(text: &str) -> Vec<PathBuf> {
    split_words(text)
        .into_iter()
        .filter(|w| !w.is_empty())
        .map(|w| resolve_user_path(&decode_file_url(&w)))
        .collect()
}

/// Shell-like word splitting: whitespace separates, quotes group, `\` escapes.
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut in_word = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    cur.push(q);
                }
            }
            '"' => {
                in_word = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => {
                            if let Some(e) = chars.next() {
                                cur.push(e);
                            }
                        }
                        _ => cur.push(q),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(e) = chars.next() {
                    cur.push(e);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                cur.push(c);
            }
        }
    }
    if in_word {
        words.push(cur);
    }
    words
}

/// `file:///a%20b` -> `/a b`. Anything else is returned unchanged.
fn decode_file_url(word: &str) -> String {
    let Some(rest) = word.strip_prefix("file://") else {
        return word.to_string();
    };
    // Skip an optional host part: file://localhost/path.
    let path = match rest.find('/') {
        Some(i) => &rest[i..],
        None => rest,
    };
    percent_decode(path)
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Expand a leading `~` to `$HOME`.
pub fn resolve_user_path(word: &str) -> PathBuf {
    if let Some(rest) = word.strip_prefix("~/").or_else(|| (word == "~").then_some("")) {
        if let Some(home) = std::env::var_os("HOME") {
            return Path::new(&home).join(rest);
        }
    }
    PathBuf::from(word)
}
