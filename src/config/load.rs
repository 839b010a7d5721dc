use std::{env, path::PathBuf};

use super::schema::Settings;

const APP_DIR: &str = "miniamp";

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `MINIAMP__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("MINIAMP")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.volume > 100 {
            return Err("audio.volume must be <= 100".to_string());
        }
        if self.audio.tick_ms == 0 {
            return Err("audio.tick_ms must be >= 1".to_string());
        }
        if self.equalizer.bands == 0 {
            return Err("equalizer.bands must be >= 1".to_string());
        }
        if self.equalizer.window_ms == 0 {
            return Err("equalizer.window_ms must be >= 1".to_string());
        }
        if !(self.equalizer.smoothing > 0.0 && self.equalizer.smoothing <= 1.0) {
            return Err("equalizer.smoothing must be in (0, 1]".to_string());
        }
        if !(self.equalizer.min_hz > 0.0 && self.equalizer.min_hz < self.equalizer.max_hz) {
            return Err("equalizer.min_hz must be > 0 and below equalizer.max_hz".to_string());
        }
        Ok(())
    }

    /// Playlist file used by save/reload: the configured one or the XDG default.
    pub fn playlist_path(&self) -> Option<PathBuf> {
        self.playlist.path.clone().or_else(default_playlist_path)
    }

    /// Log file: the configured one or the XDG default.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log.file.clone().or_else(default_log_path)
    }
}

/// Resolve the config path from `MINIAMP_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("MINIAMP_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/miniamp/config.toml`
/// or `~/.config/miniamp/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join(APP_DIR).join("config.toml"))
}

/// `$XDG_DATA_HOME/miniamp/playlist.m3u`, or under `~/.local/share`.
pub fn default_playlist_path() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share").map(|d| d.join(APP_DIR).join("playlist.m3u"))
}

/// `$XDG_STATE_HOME/miniamp/miniamp.log`, or under `~/.local/state`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join(APP_DIR).join("miniamp.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var).filter(|v| !v.is_empty()) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
