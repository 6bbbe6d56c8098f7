use std::path::{Path, PathBuf};
use std::process::Command;

use gover_platform::HideWindow;

use crate::layout::GO_EXECUTABLE;

/// Looks at the `go` the current process would run.
pub trait SessionProbe {
    /// Path of the `go` executable found on the inherited `PATH`.
    fn locate(&self) -> Option<PathBuf>;

    /// Version the executable reports about itself.
    fn report_version(&self, executable: &Path) -> Option<String>;
}

/// Probe backed by a `PATH` lookup and `go version`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathProbe;

impl SessionProbe for PathProbe {
    fn locate(&self) -> Option<PathBuf> {
        which::which(GO_EXECUTABLE).ok()
    }

    fn report_version(&self, executable: &Path) -> Option<String> {
        let output = Command::new(executable)
            .arg("version")
            .hide_window()
            .output()
            .inspect_err(|e| log::debug!("Failed to run {} version: {e}", executable.display()))
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_go_version(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `go version go1.22.0 linux/amd64`.
#[must_use]
pub fn parse_go_version(output: &str) -> Option<String> {
    let mut tokens = output.split_whitespace();
    if tokens.next()? != "go" || tokens.next()? != "version" {
        return None;
    }
    tokens
        .next()?
        .strip_prefix("go")
        .filter(|version| !version.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::parse_go_version;

    #[test]
    fn parses_release_output() {
        assert_eq!(
            parse_go_version("go version go1.22.0 linux/amd64\n").as_deref(),
            Some("1.22.0")
        );
        assert_eq!(
            parse_go_version("go version go1.23rc1 darwin/arm64").as_deref(),
            Some("1.23rc1")
        );
    }

    #[test]
    fn rejects_unexpected_output() {
        assert_eq!(parse_go_version(""), None);
        assert_eq!(parse_go_version("go: unknown command"), None);
        assert_eq!(parse_go_version("go version devel +abc linux/amd64"), None);
        assert_eq!(parse_go_version("go version go linux/amd64"), None);
    }
}
