use async_trait::async_trait;
use std::path::Path;

use crate::error::BackendError;

/// Remote list of published toolchain versions.
///
/// Implementations return identifiers without the `go` prefix, newest first.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_remote(&self, include_unstable: bool) -> Result<Vec<String>, BackendError>;

    async fn download_url(&self, version: &str) -> Result<String, BackendError>;

    async fn latest(&self, include_unstable: bool) -> Result<Option<String>, BackendError> {
        Ok(self.list_remote(include_unstable).await?.into_iter().next())
    }
}

/// Fetches and unpacks one toolchain archive so that
/// `<dest_dir>/go<version>` exists afterwards.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str, dest_dir: &Path, version: &str)
    -> Result<(), BackendError>;
}
