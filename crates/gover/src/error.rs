use gover_backend::BackendError;
use gover_core::ResolveError;
use gover_platform::AppPathsError;
use gover_shell::{ShellError, ShellType};
use thiserror::Error;

use crate::state_lock::LockError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to resolve application paths: {0}")]
    Paths(#[from] AppPathsError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("{shell} integration is not installed: {detail}; run `gover init --shell {name}`")]
    NotConfigured {
        shell: ShellType,
        name: &'static str,
        detail: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}
