use std::fs::{self, OpenOptions};

use crate::config;

/// Send log records to the configured log file; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides `log.level`. Logging is skipped (with a note on stderr)
/// when no log file can be opened.
pub fn init(settings: &config::Settings) {
    let Some(path) = settings.log_path() else {
        eprintln!("miniamp: no log location available, logging disabled");
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("miniamp: cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let env = env_logger::Env::default().default_filter_or(settings.log.level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();

    log::info!("miniamp {} starting up", env!("CARGO_PKG_VERSION"));
}
