use crate::config;

/// Load and validate the config. A broken config never stops the player:
/// defaults are used and the reason is returned for the status line.
pub fn load_settings() -> (config::Settings, Option<String>) {
    let loaded = config::Settings::load()
        .map_err(|e| format!("failed to load config: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config: {msg}")),
        });

    match loaded {
        Ok(s) => (s, None),
        Err(reason) => {
            eprintln!("miniamp: {reason}, using defaults");
            (config::Settings::default(), Some(reason))
        }
    }
}
