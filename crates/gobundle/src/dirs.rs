//! Platform-specific directory lookup

use std::path::PathBuf;

use etcetera::BaseStrategy;

pub const APP_DIR: &str = "gobundle";
pub const CONFIG_FILE_NAME: &str = "gobundle.toml";

/// Per-user configuration directory, e.g. `~/.config/gobundle` on Linux
pub fn user_config_dir() -> Option<PathBuf> {
    etcetera::choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir().join(APP_DIR))
}

/// Location of the per-user configuration file, whether or not it exists
pub fn user_config_file() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}
