use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Version the system link should point at; written by `use --system`.
    #[serde(default)]
    pub default_version: Option<String>,

    /// Project marker file name looked up in the working directory.
    #[serde(default = "default_version_file")]
    pub version_file: String,

    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_version_file() -> String {
    ".go-version".to_string()
}

fn default_catalog_url() -> String {
    "https://go.dev/dl/".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_version: None,
            version_file: default_version_file(),
            data_dir: None,
            catalog_url: default_catalog_url(),
            http_timeout_secs: default_http_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl Settings {
    /// Missing, unreadable or malformed files load as defaults.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        Self::try_load(path).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed settings file {}: {e}", path.display());
            Self::default()
        })
    }

    /// Like [`Settings::load`], but hands a parse failure back to the caller
    /// instead of logging it.
    ///
    /// # Errors
    /// Returns the parse error when the file exists but is not valid settings
    /// JSON.
    pub fn try_load(path: &Path) -> Result<Self, serde_json::Error> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)?;
        gover_platform::write_atomic(path, content.as_bytes())
    }
}
