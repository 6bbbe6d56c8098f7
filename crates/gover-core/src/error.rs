use gover_backend::BackendError;
use gover_shell::ShellError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no Go version is active: {link} does not exist; run `gover use <version> --system`")]
    NothingActive { link: PathBuf },

    #[error(
        "default version {version} is installed but not linked at {link}; run `gover use {version} --system`"
    )]
    DefaultNotActivated { version: String, link: PathBuf },

    #[error(
        "default version {version} is not installed ({path} is missing); install it, then run `gover use {version} --system`"
    )]
    DefaultNotInstalled { version: String, path: PathBuf },

    #[error("{link} exists but is not a symlink; remove it, then run `gover use <version> --system`")]
    LinkNotSymlink { link: PathBuf },

    #[error(
        "{link} points at {version}, but {dir} is missing; reinstall {version} or run `gover use <version> --system`"
    )]
    VersionDirMissing {
        version: String,
        link: PathBuf,
        dir: PathBuf,
    },

    #[error("{version} is installed but {path} is missing; reinstall {version}")]
    ExecutableMissing { version: String, path: PathBuf },

    #[error(
        "{link} points at {target}, which is not a gover-managed toolchain; the link is corrupted, recreate it with `gover use <version> --system`"
    )]
    LinkTargetForeign { link: PathBuf, target: PathBuf },

    #[error(
        "{marker} requests {version}, which is not installed; install it or run `gover use <version> --project`"
    )]
    MarkerVersionMissing { version: String, marker: PathBuf },

    #[error("{marker} is empty; run `gover use <version> --project` to pin a version")]
    EmptyMarker { marker: PathBuf },

    #[error("{version} is not installed ({path} is missing)")]
    NotInstalled { version: String, path: PathBuf },

    #[error("{version} is active and cannot be uninstalled; switch with `gover use <version>` first")]
    VersionActive { version: String },

    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error("{context} {path}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum InstallError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{version} is already installed at {path}")]
    AlreadyInstalled { version: String, path: PathBuf },

    #[error("download of {version} finished but {path} was not created")]
    Incomplete { version: String, path: PathBuf },

    #[error("{context} {path}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
