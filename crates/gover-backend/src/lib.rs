mod error;
mod traits;
mod types;

pub use error::{BackendError, NetworkStage};
pub use traits::{Catalog, Downloader};
pub use types::{
    InstalledVersion, PreRelease, PreReleaseKind, ToolchainVersion, VersionComponent,
    VersionParseError,
};
