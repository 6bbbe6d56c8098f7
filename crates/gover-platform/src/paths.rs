use std::path::PathBuf;
use thiserror::Error;

/// Environment variable that relocates the data directory (installed
/// versions, the managed `bin` directory and the debug log).
pub const DATA_DIR_ENV: &str = "GOVER_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Build application paths for the current platform.
    ///
    /// `GOVER_DIR` overrides the data directory when set to a non-empty value.
    ///
    /// # Errors
    /// Returns an error when a required base directory (for example the user
    /// home/config/data directory) cannot be determined.
    pub fn new() -> Result<Self, AppPathsError> {
        let env_dir = std::env::var_os(DATA_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            Ok(Self {
                config_dir: home.join("Library/Application Support/gover"),
                data_dir: env_dir.unwrap_or_else(|| home.join("Library/Application Support/gover")),
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            let data_dir = match env_dir {
                Some(dir) => dir,
                None => dirs::data_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join("gover"),
            };
            Ok(Self {
                config_dir: dirs::config_dir()
                    .ok_or(AppPathsError::ConfigDirUnavailable)?
                    .join("gover"),
                data_dir,
            })
        }
    }

    /// Point the data directory somewhere else, unless `GOVER_DIR` already did.
    #[must_use]
    pub fn with_data_dir_fallback(mut self, dir: Option<PathBuf>) -> Self {
        let env_set = std::env::var_os(DATA_DIR_ENV).is_some_and(|value| !value.is_empty());
        if let Some(dir) = dir
            && !env_set
        {
            self.data_dir = dir;
        }
        self
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("debug.log")
    }

    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        self.data_dir.join("state.lock")
    }

    /// Root directory holding one `go<version>` directory per installed version.
    #[must_use]
    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    /// Directory holding the system-wide link; this is what shell init puts on `PATH`.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.data_dir.join("bin")
    }
}
