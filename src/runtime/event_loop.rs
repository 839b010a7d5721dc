use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::ui;

use super::paste::parse_paths;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: draws, handles input and ticks playback every
/// `audio.tick_ms`. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.audio.tick_ms.max(1));
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, settings, app, state) {
                        break;
                    }
                }
                Event::Paste(text) => handle_paste(&text, app),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick {
            app.tick();
            last_tick = Instant::now();
        }
    }

    app.stop();
    info!("quit");
    Ok(())
}

/// Files dropped onto the terminal arrive as a bracketed paste.
pub fn handle_paste(text: &str, app: &mut App) {
    let paths = parse_paths(text);
    debug!("paste: {} path(s)", paths.len());
    app.add_paths(&paths);
}

/// Apply one key press. Returns `true` when the user asked to quit.
pub fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    state: &mut EventLoopState,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }
    let seek = settings.controls.seek_seconds.min(i64::MAX as u64) as i64;
    let step = i32::from(settings.controls.volume_step);

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Right if ctrl => app.next_track(),
        KeyCode::Left if ctrl => app.prev_track(),
        KeyCode::Char('l') => app.next_track(),
        KeyCode::Char('h') => app.prev_track(),
        KeyCode::Char(' ') | KeyCode::Char('p') => app.toggle_play_pause(),
        KeyCode::Enter => app.play_selected(),
        KeyCode::Char('x') => app.stop(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('J') => {
            app.follow_playback_off();
            app.move_selected(1);
        }
        KeyCode::Char('K') => {
            app.follow_playback_off();
            app.move_selected(-1);
        }
        KeyCode::Char('L') => app.seek_by(seek),
        KeyCode::Char('H') => app.seek_by(-seek),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(step),
        KeyCode::Char('-') => app.change_volume(-step),
        KeyCode::Char('s') => app.toggle_shuffle(),
        KeyCode::Char('r') => app.cycle_loop_mode(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
        KeyCode::Char('c') => app.clear_playlist(),
        KeyCode::Char('w') => app.export_playlist(),
        KeyCode::Char('o') => app.reload_playlist(),
        _ => {}
    }

    false
}
