use gover_backend::{BackendError, Catalog, Downloader};
use log::info;

use crate::error::InstallError;
use crate::layout::ToolchainLayout;
use crate::resolver::resolve_version;

/// Resolve `token`, download it into the versions root and confirm the
/// version directory appeared. Returns the installed version.
///
/// Any downloader failure surfaces as `BackendError::DownloadFailed` for the
/// resolved version.
pub async fn install(
    token: &str,
    catalog: &dyn Catalog,
    downloader: &dyn Downloader,
    layout: &ToolchainLayout,
) -> Result<String, InstallError> {
    let version = resolve_version(token, catalog).await?;
    let dir = layout.version_dir(&version);
    if dir.is_dir() {
        return Err(InstallError::AlreadyInstalled { version, path: dir });
    }

    let url = catalog.download_url(&version).await?;
    let root = layout.versions_root();
    std::fs::create_dir_all(root).map_err(|source| InstallError::Io {
        context: "failed to create directory",
        path: root.to_path_buf(),
        source,
    })?;

    info!("Downloading {version} from {url}");
    downloader
        .download(&url, root, &version)
        .await
        .map_err(|error| match error {
            BackendError::DownloadFailed { .. } => error,
            other => BackendError::download_failed(&version, other.to_string()),
        })?;

    if !dir.is_dir() {
        return Err(InstallError::Incomplete { version, path: dir });
    }
    info!("Installed {version} to {}", dir.display());
    Ok(version)
}
