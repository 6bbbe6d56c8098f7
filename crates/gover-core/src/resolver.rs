//! Decides which installed toolchain is active and switches it.
//!
//! Three scopes overlap. A session override (a managed version's `bin`
//! directory first on `PATH`) beats a project marker in the working
//! directory, which beats the system-wide link.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gover_backend::{BackendError, Catalog, InstalledVersion};
use gover_shell::ShellType;
use log::{debug, info, warn};

use crate::error::ResolveError;
use crate::layout::{ToolchainLayout, is_version_id};
use crate::probe::SessionProbe;
use crate::settings::Settings;
use crate::symlink;

/// Token that stands for the system default in `use`.
pub const DEFAULT_SENTINEL: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationScope {
    /// Only the invoking shell, through a PATH change it evaluates.
    Session,
    /// The working directory, through the marker file.
    Project,
    /// Every shell, through the link in the managed bin directory.
    System,
}

impl ActivationScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Project => "project",
            Self::System => "system",
        }
    }
}

pub struct Resolver {
    settings: Settings,
    settings_path: PathBuf,
    layout: ToolchainLayout,
    work_dir: PathBuf,
    shell: ShellType,
    probe: Box<dyn SessionProbe>,
}

impl Resolver {
    #[must_use]
    pub fn new(
        settings: Settings,
        settings_path: PathBuf,
        layout: ToolchainLayout,
        work_dir: PathBuf,
        shell: ShellType,
        probe: Box<dyn SessionProbe>,
    ) -> Self {
        Self {
            settings,
            settings_path,
            layout,
            work_dir,
            shell,
            probe,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &ToolchainLayout {
        &self.layout
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.work_dir.join(&self.settings.version_file)
    }

    /// The active version.
    pub fn current(&self) -> Result<String, ResolveError> {
        self.current_scoped().map(|(version, _)| version)
    }

    /// The active version and the scope that made it active.
    pub fn current_scoped(&self) -> Result<(String, ActivationScope), ResolveError> {
        if let Some(version) = self.session_version() {
            debug!("Session override active: {version}");
            return Ok((version, ActivationScope::Session));
        }

        if let Some(version) = self.project_version()? {
            debug!("Project marker active: {version}");
            return Ok((version, ActivationScope::Project));
        }

        self.current_global()
            .map(|version| (version, ActivationScope::System))
    }

    fn session_version(&self) -> Option<String> {
        let executable = self.probe.locate()?;
        // Only a managed version's bin dir counts. The system link's dir is
        // also on PATH after init and must not shadow the project marker.
        self.layout.version_from_executable(&executable)?;
        self.probe.report_version(&executable)
    }

    fn project_version(&self) -> Result<Option<String>, ResolveError> {
        let marker = self.marker_path();
        let content = match fs::read_to_string(&marker) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(ResolveError::io("failed to read", marker, error)),
        };

        let version = content.trim();
        if version.is_empty() {
            return Err(ResolveError::EmptyMarker { marker });
        }
        if !self.is_installed(version) {
            return Err(ResolveError::MarkerVersionMissing {
                version: version.to_string(),
                marker,
            });
        }
        Ok(Some(version.to_string()))
    }

    /// The version the system link points at.
    pub fn current_global(&self) -> Result<String, ResolveError> {
        let link = self.layout.link_path();

        let metadata = match fs::symlink_metadata(link) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(self.no_link_error());
            }
            Err(error) => return Err(ResolveError::io("failed to inspect", link, error)),
        };

        if !metadata.file_type().is_symlink() {
            return Err(ResolveError::LinkNotSymlink {
                link: link.to_path_buf(),
            });
        }

        let target = symlink::read_link(link)
            .map_err(|error| ResolveError::io("failed to read link", link, error))?;
        let Some(version) = self.layout.version_from_executable(&target) else {
            return Err(ResolveError::LinkTargetForeign {
                link: link.to_path_buf(),
                target,
            });
        };

        let dir = self.layout.version_dir(&version);
        if !dir.is_dir() {
            return Err(ResolveError::VersionDirMissing {
                version,
                link: link.to_path_buf(),
                dir,
            });
        }

        let executable = self.layout.executable(&version);
        if !executable.is_file() {
            return Err(ResolveError::ExecutableMissing {
                version,
                path: executable,
            });
        }

        Ok(version)
    }

    fn no_link_error(&self) -> ResolveError {
        let link = self.layout.link_path().to_path_buf();
        match self.default_version() {
            None => ResolveError::NothingActive { link },
            Some(version) if self.is_installed(version) => ResolveError::DefaultNotActivated {
                version: version.to_string(),
                link,
            },
            Some(version) => ResolveError::DefaultNotInstalled {
                version: version.to_string(),
                path: self.layout.version_dir(version),
            },
        }
    }

    /// Activate `token` at `scope`.
    ///
    /// Shell commands for the caller to evaluate go to `out`; everything meant
    /// for a human goes to `err`.
    pub fn use_version<W: Write, E: Write>(
        &mut self,
        token: &str,
        scope: ActivationScope,
        out: &mut W,
        err: &mut E,
    ) -> Result<(), ResolveError> {
        let token = token.trim();
        let version = if token == DEFAULT_SENTINEL {
            self.current_global()?
        } else {
            token.to_string()
        };

        match scope {
            ActivationScope::Project => self.use_project(&version, err),
            ActivationScope::System => self.use_system(&version, err),
            ActivationScope::Session => {
                self.require_installed(&version)?;
                let bin = self.layout.bin_dir(&version);
                info!("Activating {version} for this {} session", self.shell.name());
                self.shell.execute_path_command(&bin, out, err)?;
                Ok(())
            }
        }
    }

    fn use_project<E: Write>(&self, version: &str, err: &mut E) -> Result<(), ResolveError> {
        let marker = self.marker_path();
        gover_platform::write_atomic(&marker, format!("{version}\n").as_bytes())
            .map_err(|error| ResolveError::io("failed to write", &marker, error))?;
        info!("Pinned {version} in {}", marker.display());

        if !self.is_installed(version) {
            warn!("Pinned {version}, which is not installed");
            let _ = writeln!(
                err,
                "gover: warning: {version} is not installed; {} will not resolve until it is",
                marker.display()
            );
        }
        let _ = writeln!(err, "gover: pinned {version} in {}", marker.display());
        Ok(())
    }

    fn use_system<E: Write>(&mut self, version: &str, err: &mut E) -> Result<(), ResolveError> {
        self.require_installed(version)?;
        self.link(version)?;

        self.settings.default_version = Some(version.to_string());
        if let Err(error) = self.settings.save(&self.settings_path) {
            warn!(
                "Failed to persist default version to {}: {error}",
                self.settings_path.display()
            );
            let _ = writeln!(
                err,
                "gover: warning: {version} is linked but could not be saved as the default: {error}"
            );
        }

        let _ = writeln!(err, "gover: {version} is now the system default");
        Ok(())
    }

    fn link(&self, version: &str) -> Result<(), ResolveError> {
        let link = self.layout.link_path();
        symlink::create(&self.layout.executable(version), link)
            .map_err(|error| ResolveError::io("failed to link", link, error))?;
        info!("Linked {} to {version}", link.display());
        Ok(())
    }

    fn require_installed(&self, version: &str) -> Result<(), ResolveError> {
        if self.is_installed(version) {
            Ok(())
        } else {
            Err(ResolveError::NotInstalled {
                version: version.to_string(),
                path: self.layout.version_dir(version),
            })
        }
    }

    #[must_use]
    pub fn is_installed(&self, version: &str) -> bool {
        is_version_id(version) && self.layout.version_dir(version).is_dir()
    }

    #[must_use]
    pub fn default_version(&self) -> Option<&str> {
        self.settings
            .default_version
            .as_deref()
            .filter(|version| !version.is_empty())
    }

    /// Installed versions, newest first.
    pub fn list_installed(&self) -> Result<Vec<InstalledVersion>, ResolveError> {
        let root = self.layout.versions_root();
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(ResolveError::io("failed to list", root, error)),
        };

        let mut versions = Vec::new();
        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name();
            let Some(version) = name.to_str().and_then(ToolchainLayout::version_from_dir_name)
            else {
                continue;
            };
            let path = entry.path();
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            if !metadata.is_dir() {
                continue;
            }

            versions.push(InstalledVersion {
                version: version.to_string(),
                disk_size: dir_size(&path),
                installed_at: metadata
                    .created()
                    .or_else(|_| metadata.modified())
                    .ok()
                    .map(DateTime::<Utc>::from),
                path,
            });
        }

        InstalledVersion::sort_newest_first(&mut versions);
        Ok(versions)
    }

    /// Remove an installed version that is not currently active.
    pub fn uninstall(&mut self, version: &str) -> Result<(), ResolveError> {
        self.require_installed(version)?;

        let active = self.current().ok();
        let linked = self.current_global().ok();
        if active.as_deref() == Some(version) || linked.as_deref() == Some(version) {
            return Err(ResolveError::VersionActive {
                version: version.to_string(),
            });
        }

        let dir = self.layout.version_dir(version);
        fs::remove_dir_all(&dir).map_err(|error| ResolveError::io("failed to remove", &dir, error))?;
        info!("Uninstalled {version} from {}", dir.display());

        if self.default_version() == Some(version) {
            self.settings.default_version = None;
            if let Err(error) = self.settings.save(&self.settings_path) {
                warn!("Failed to clear default version: {error}");
            }
        }
        Ok(())
    }

    /// Recreate the system link for the configured default, when it is
    /// installed. Returns the linked version.
    pub fn ensure_default_linked(&self) -> Result<Option<String>, ResolveError> {
        let Some(version) = self.default_version() else {
            return Ok(None);
        };
        if !self.is_installed(version) {
            warn!("Default version {version} is not installed; leaving the link alone");
            return Ok(None);
        }

        self.link(version)?;
        Ok(Some(version.to_string()))
    }
}

/// Expand `latest` and `<major>.<minor>` tokens against the catalog. Any other
/// token is returned unchanged.
pub async fn resolve_version(token: &str, catalog: &dyn Catalog) -> Result<String, BackendError> {
    let token = token.trim();

    if token == "latest" {
        return catalog
            .latest(false)
            .await?
            .ok_or_else(|| BackendError::VersionNotFound {
                version: token.to_string(),
            });
    }

    if token.matches('.').count() == 1 {
        let versions = catalog.list_remote(true).await?;
        return versions
            .into_iter()
            .find(|candidate| matches_minor(candidate, token))
            .ok_or_else(|| BackendError::VersionNotFound {
                version: token.to_string(),
            });
    }

    Ok(token.to_string())
}

fn matches_minor(candidate: &str, prefix: &str) -> bool {
    match candidate.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.chars().next().is_some_and(|c| !c.is_ascii_digit()),
        None => false,
    }
}

fn dir_size(path: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(path) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| match entry.file_type() {
            Ok(kind) if kind.is_dir() => dir_size(&entry.path()),
            Ok(kind) if kind.is_file() => entry.metadata().map_or(0, |m| m.len()),
            _ => 0,
        })
        .sum()
}
