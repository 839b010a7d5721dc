//! UI rendering for the terminal user interface.
//!
//! `draw` renders the whole screen from the `App` with `ratatui`; nothing here
//! mutates state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::audio::PlaybackState;
use crate::config::{ControlsSettings, TimeField, UiSettings};

mod equalizer;

use equalizer::EqualizerWidget;


const CONTROLS: &[(&str, &str)] = &[
    ("space/p", "play/pause"),
    ("enter", "play selected"),
    ("^←/^→ h/l", "prev/next"),
    ("x", "stop"),
    ("j/k", "up/down"),
    ("gg/G", "top/bottom"),
    ("J/K", "move track"),
    ("d", "remove"),
    ("c", "clear"),
    ("s", "shuffle"),
    ("r", "loop mode"),
    ("w/o", "save/load playlist"),
    ("q", "quit"),
];

/// Render the controls help text, incorporating the seek and volume steps.
fn controls_text(controls: &ControlsSettings) -> String {
    let mut parts: Vec<String> = CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect();
    // Keep the configurable entries next to the transport keys.
    parts.insert(
        4,
        format!("[H/L] seek -/+{}s", controls.seek_seconds),
    );
    parts.insert(5, format!("[+/-] volume ±{}", controls.volume_step));
    parts.join(" | ")
}

/// Format a `Duration` as `MM:SS`, or `H:MM:SS` from one hour up.
fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .filter_map(|f| match f {
            TimeField::Elapsed => Some(format_clock(elapsed)),
            TimeField::Total => total.map(format_clock),
            TimeField::Remaining => {
                total.map(|t| format!("-{}", format_clock(t.saturating_sub(elapsed))))
            }
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// The status box text: playback state, track, time and modes.
fn status_text(app: &App, ui: &UiSettings) -> String {
    let session = &app.session;
    let mut parts: Vec<String> = Vec::new();

    let state = match session.state() {
        PlaybackState::Playing => "▶ Playing",
        PlaybackState::Paused => "⏸ Paused",
        PlaybackState::Stopped => "■ Stopped",
    };
    parts.push(state.to_string());

    if session.state() != PlaybackState::Stopped {
        if let Some(track) = session.current_track() {
            match now_playing_time_text(session.elapsed(), session.duration(), ui) {
                Some(time) => parts.push(format!("{} [{}]", track.title, time)),
                None => parts.push(track.title.clone()),
            }
        }
    }

    parts.push(format!(
        "Shuffle: {}",
        if session.shuffle() { "ON" } else { "OFF" }
    ));
    parts.push(format!("Loop: {}", session.loop_mode().label()));
    parts.push(format!("Vol: {}%", session.volume()));
    parts.push(if app.follow_playback {
        "Cursor: Follow".to_string()
    } else {
        "Cursor: Free-roam".to_string()
    });

    parts.join(" • ")
}

/// Slice of the list to render so that the selection stays near the middle.
///
/// Returns `(start, end, selected position inside the slice)`.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, controls: &ControlsSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(8),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" miniamp ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app, ui_settings))
        .block(padded(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    let eq = EqualizerWidget::new(&app.session.snapshot().levels)
        .block(Block::default().borders(Borders::ALL).title(" equalizer "));
    frame.render_widget(eq, chunks[2]);

    draw_playlist(frame, app, chunks[3]);

    let message = match app.status() {
        Some(s) if s.is_error => Paragraph::new(s.text.as_str()).red(),
        Some(s) => Paragraph::new(s.text.as_str()),
        None => Paragraph::new("drop files or folders here to add them").dim(),
    };
    frame.render_widget(message.block(padded(" message ")), chunks[4]);

    let footer = Paragraph::new(controls_text(controls))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let tracks = app.session.playlist().tracks();
    let now_playing = match app.session.state() {
        PlaybackState::Stopped => None,
        _ => app.session.current(),
    };

    // Only build ListItems for the visible window.
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, selected_in_view) = visible_window(tracks.len(), height, app.selected);

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let index = start + offset;
            let marker = if now_playing == Some(index) { "♪ " } else { "  " };
            let time = track.duration.map(format_clock).unwrap_or_default();
            let item = ListItem::new(format!("{marker}{:>3}. {}  {time}", index + 1, track.title));
            if now_playing == Some(index) {
                item.style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let title = format!(" playlist ({}) ", tracks.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !tracks.is_empty() {
        state.select(Some(selected_in_view));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
