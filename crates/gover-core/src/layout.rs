use std::path::{Component, Path, PathBuf};

/// Executable file name of the Go toolchain on this platform.
pub const GO_EXECUTABLE: &str = if cfg!(windows) { "go.exe" } else { "go" };

/// Prefix of every version directory (`go1.22.0`).
pub const VERSION_DIR_PREFIX: &str = "go";

/// Where versions live and where the system-wide link goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainLayout {
    versions_root: PathBuf,
    link_path: PathBuf,
}

impl ToolchainLayout {
    #[must_use]
    pub fn new(versions_root: PathBuf, link_dir: &Path) -> Self {
        Self {
            versions_root,
            link_path: link_dir.join(GO_EXECUTABLE),
        }
    }

    #[must_use]
    pub fn versions_root(&self) -> &Path {
        &self.versions_root
    }

    #[must_use]
    pub fn link_path(&self) -> &Path {
        &self.link_path
    }

    /// Directory holding the system link; this is what shell init puts on `PATH`.
    #[must_use]
    pub fn link_dir(&self) -> &Path {
        self.link_path.parent().unwrap_or(&self.link_path)
    }

    #[must_use]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions_root
            .join(format!("{VERSION_DIR_PREFIX}{version}"))
    }

    #[must_use]
    pub fn bin_dir(&self, version: &str) -> PathBuf {
        self.version_dir(version).join("bin")
    }

    #[must_use]
    pub fn executable(&self, version: &str) -> PathBuf {
        self.bin_dir(version).join(GO_EXECUTABLE)
    }

    /// Version named by a `go<version>` directory name.
    #[must_use]
    pub fn version_from_dir_name(name: &str) -> Option<&str> {
        name.strip_prefix(VERSION_DIR_PREFIX)
            .filter(|version| is_version_id(version))
    }

    /// Invert [`Self::executable`]: the version whose executable `path` is, if
    /// `path` has exactly the `<versions_root>/go<V>/bin/go` shape.
    ///
    /// Paths are compared lexically; nothing is resolved on disk.
    #[must_use]
    pub fn version_from_executable(&self, path: &Path) -> Option<String> {
        let path = normalize_lexically(path);
        if path.file_name()? != GO_EXECUTABLE {
            return None;
        }
        let bin = path.parent()?;
        if bin.file_name()? != "bin" {
            return None;
        }
        let version_dir = bin.parent()?;
        if version_dir.parent()? != normalize_lexically(&self.versions_root) {
            return None;
        }
        let name = version_dir.file_name()?.to_str()?;
        Self::version_from_dir_name(name).map(str::to_string)
    }
}

/// A version id usable as a single directory name component.
#[must_use]
pub fn is_version_id(version: &str) -> bool {
    !version.is_empty()
        && version != "."
        && version != ".."
        && !version.contains(['/', '\\'])
        && !version.chars().any(char::is_whitespace)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ToolchainLayout {
        ToolchainLayout::new(PathBuf::from("/data/versions"), Path::new("/data/bin"))
    }

    #[test]
    fn paths_follow_prefix_convention() {
        let layout = layout();

        assert_eq!(layout.version_dir("1.22.0"), Path::new("/data/versions/go1.22.0"));
        assert_eq!(layout.bin_dir("1.22.0"), Path::new("/data/versions/go1.22.0/bin"));
        assert_eq!(
            layout.executable("1.22.0"),
            Path::new("/data/versions/go1.22.0/bin").join(GO_EXECUTABLE)
        );
        assert_eq!(layout.link_path(), Path::new("/data/bin").join(GO_EXECUTABLE));
        assert_eq!(layout.link_dir(), Path::new("/data/bin"));
    }

    #[test]
    fn version_from_executable_inverts_executable() {
        let layout = layout();

        assert_eq!(
            layout.version_from_executable(&layout.executable("1.21rc2")),
            Some("1.21rc2".to_string())
        );
    }

    #[test]
    fn version_from_executable_handles_relative_segments() {
        let layout = layout();
        let relative = Path::new("/data/bin")
            .join("..")
            .join("versions")
            .join("go1.22.0")
            .join("bin")
            .join(GO_EXECUTABLE);

        assert_eq!(
            layout.version_from_executable(&relative),
            Some("1.22.0".to_string())
        );
    }

    #[test]
    fn version_from_executable_rejects_foreign_paths() {
        let layout = layout();

        let system_go = Path::new("/usr/local/go/bin").join(GO_EXECUTABLE);
        assert_eq!(layout.version_from_executable(&system_go), None);

        let nested = Path::new("/data/versions/go1.22.0/pkg/bin").join(GO_EXECUTABLE);
        assert_eq!(layout.version_from_executable(&nested), None);

        let unprefixed = Path::new("/data/versions/1.22.0/bin").join(GO_EXECUTABLE);
        assert_eq!(layout.version_from_executable(&unprefixed), None);

        let link = layout.link_path().to_path_buf();
        assert_eq!(layout.version_from_executable(&link), None);
    }

    #[test]
    fn version_ids_must_be_single_components() {
        assert!(is_version_id("1.22.0"));
        assert!(!is_version_id(""));
        assert!(!is_version_id(".."));
        assert!(!is_version_id("1.22/../../etc"));
        assert!(!is_version_id("1.22 0"));
        assert_eq!(ToolchainLayout::version_from_dir_name("go"), None);
        assert_eq!(ToolchainLayout::version_from_dir_name("go1.20"), Some("1.20"));
    }
}
