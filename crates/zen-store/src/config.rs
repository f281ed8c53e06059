//! Optional companion configuration file.

use std::path::Path;

use serde::Deserialize;

/// `config.toml` at the data-dir root. Every field is optional; a missing
/// or malformed file reads as defaults, matching how record loads behave.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Remote backend base URL, e.g. `http://localhost:5000`.
    pub backend_url: Option<String>,
    /// User id to use when no `--user` flag or env override is present.
    pub user: Option<String>,
    /// Default meditation length in minutes.
    pub default_minutes: Option<u32>,
}

impl Config {
    pub fn load(base_dir: &Path) -> Self {
        let path = base_dir.join("config.toml");
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
