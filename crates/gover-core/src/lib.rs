//! Version activation for installed Go toolchains.
//!
//! This crate holds the logic shared by every front end:
//! - The resolver that answers "which version is active" and switches it.
//! - The on-disk layout of installed versions and the system link.
//! - Persisted settings.
//! - The `go.dev` catalog client and install orchestration.

mod catalog;
mod error;
mod install;
mod layout;
mod probe;
mod resolver;
mod settings;
pub mod symlink;

pub use catalog::GoDevCatalog;
pub use error::{InstallError, ResolveError};
pub use install::install;
pub use layout::{GO_EXECUTABLE, ToolchainLayout, VERSION_DIR_PREFIX, is_version_id};
pub use probe::{PathProbe, SessionProbe, parse_go_version};
pub use resolver::{ActivationScope, DEFAULT_SENTINEL, Resolver, resolve_version};
pub use settings::Settings;
