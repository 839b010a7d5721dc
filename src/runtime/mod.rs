use std::env;
use std::path::PathBuf;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::RodioBackend;
use crate::session::Session;

mod event_loop;
mod logging;
mod paste;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();
    logging::init(&settings);

    let args: Vec<PathBuf> = env::args_os()
        .skip(1)
        .map(|a| paste::resolve_user_path(&a.to_string_lossy()))
        .collect();

    let backend = RodioBackend::open_default()?;
    let session = Session::new(&settings, Box::new(backend));
    let playlist_path = settings
        .playlist_path()
        .unwrap_or_else(|| PathBuf::from("miniamp.m3u"));
    let mut app = App::new(session, playlist_path);

    startup::apply_startup(&mut app, &settings, &args);
    if let Some(reason) = config_problem {
        log::warn!("{reason}");
        app.set_status(format!("{reason}; using defaults"));
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut terminal, &settings, &mut app, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
