use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error(
        "{shell} integration is already configured in {path}; run `gover init --shell {name} --force` to replace it"
    )]
    AlreadyConfigured {
        shell: &'static str,
        name: &'static str,
        path: PathBuf,
    },

    #[error(
        "{path}:{line} starts a gover block but no `{end_marker}` line follows; remove the partial block by hand, then run `gover init`"
    )]
    UnterminatedBlock {
        path: PathBuf,
        line: usize,
        end_marker: String,
    },

    #[error("cannot write to {dir}: {source}")]
    PermissionProbe {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{shell} has no startup file location")]
    NoConfigFile { shell: &'static str },

    #[error("wrapper script {path} already exists; run `gover init --shell cmd --force` to regenerate it")]
    WrapperExists { path: PathBuf },

    #[error("bin directory path is empty")]
    EmptyPath,

    #[error("refusing bin directory with a `..` segment: {path}")]
    PathTraversal { path: PathBuf },

    #[error("bin directory does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("bin directory is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("{context} {path}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write shell output: {0}")]
    Output(#[source] io::Error),
}

impl ShellError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
