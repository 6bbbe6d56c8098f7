mod atomic_write;
mod commands;
mod paths;

pub use atomic_write::{resolve_write_target, write_atomic};
pub use commands::HideWindow;
pub use paths::{AppPaths, AppPathsError, DATA_DIR_ENV};
