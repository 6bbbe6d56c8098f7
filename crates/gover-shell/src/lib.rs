#![allow(clippy::missing_errors_doc)]

mod config;
mod detect;
mod error;
mod init;
mod verify;
mod wrapper;

pub mod shells;

pub use config::{ShellConfig, ShellConfigEdit};
pub use detect::{SHELL_OVERRIDE_ENV, ShellType};
pub use error::ShellError;
pub use init::{InitOutcome, deinitialize, deinitialize_profile, initialize, initialize_profile};
pub use verify::{VerificationResult, verify_shell_config};
pub use wrapper::CMD_WRAPPER_NAME;
