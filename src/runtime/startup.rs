use std::path::PathBuf;

use log::info;

use crate::app::App;
use crate::config;

/// Apply the configured shuffle/loop defaults and load the initial tracks:
/// the saved playlist when `restore_on_start` is set, then the CLI `args`.
pub fn apply_startup(app: &mut App, settings: &config::Settings, args: &[PathBuf]) {
    app.session.set_loop_mode(settings.playback.loop_mode.into());

    if settings.playlist.restore_on_start && app.playlist_path.is_file() {
        let path = app.playlist_path.clone();
        app.load_from(&path);
    }

    app.add_paths(args);

    // Enabled after loading: the first shuffle cycle covers every loaded track.
    if settings.playback.shuffle {
        app.session.set_shuffle(true);
    }
    info!(
        "startup: {} track(s), shuffle {}, loop {}",
        app.session.playlist().len(),
        app.session.shuffle(),
        app.session.loop_mode().label()
    );
}
