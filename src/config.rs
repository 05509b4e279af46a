//! Configuration to acknowledge user preferences as well as set defaults.
//!
//! Specifically, we try to find a patchtoggle.toml, and if present we load settings from there.
//! This provides file extension and grid layout preferences.

use facet::Facet;
use std::fs;

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "patchtoggle.toml";

#[derive(Facet, Clone, Debug)]
/// User preferences loaded from patchtoggle.toml or falling back to defaults.
pub struct Config {
    #[facet(default = vec!["patch".to_string()])]
    /// File suffixes to match when scanning directories.
    pub file_extensions: Vec<String>,
    #[facet(default = 3)]
    /// Checkbox columns per row in `--list` output.
    pub columns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_extensions: vec!["patch".to_string()],
            columns: 3,
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from patchtoggle.toml if present.
    pub fn load() -> Self {
        match fs::read_to_string(CONFIG_FILE) {
            Ok(contents) => Self::from_toml(&contents),
            Err(_) => Self::default(),
        }
    }

    #[must_use]
    /// Parse configuration text, falling back to defaults if it does not parse.
    pub fn from_toml(contents: &str) -> Self {
        match facet_toml::from_str::<Self>(contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(file = CONFIG_FILE, error = ?e, "ignoring unreadable config");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
