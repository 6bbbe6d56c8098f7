use crate::config::ShellConfig;
use crate::detect::ShellType;
use crate::wrapper::CMD_WRAPPER_NAME;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Configured,
    NotConfigured,
    ConfigFileNotFound,
    /// The dialect cannot be configured on this platform.
    Unsupported,
    Error(String),
}

/// Check whether the managed block (or the cmd wrapper under `bin_path`) is
/// in place. Never modifies anything.
#[must_use]
pub fn verify_shell_config(shell_type: ShellType, bin_path: &Path) -> VerificationResult {
    if shell_type == ShellType::Cmd {
        if !cfg!(windows) {
            return VerificationResult::Unsupported;
        }
        return if bin_path.join(CMD_WRAPPER_NAME).is_file() {
            VerificationResult::Configured
        } else {
            VerificationResult::NotConfigured
        };
    }

    let Some(home) = dirs::home_dir() else {
        return VerificationResult::Error("home directory is unknown".to_string());
    };
    let candidates = shell_type.config_candidates(&home, |key| std::env::var(key).ok());
    verify_candidates(shell_type, &candidates)
}

fn verify_candidates(shell_type: ShellType, candidates: &[std::path::PathBuf]) -> VerificationResult {
    let Some(config_path) = candidates.iter().find(|path| path.exists()) else {
        return VerificationResult::ConfigFileNotFound;
    };

    match ShellConfig::load(shell_type, config_path.clone()) {
        Ok(config) if config.has_init() => match config.remove_managed_blocks() {
            Ok(_) => VerificationResult::Configured,
            Err(e) => VerificationResult::Error(e.to_string()),
        },
        Ok(_) => VerificationResult::NotConfigured,
        Err(e) => VerificationResult::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_profile_is_reported() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let candidates = vec![temp_dir.path().join(".bashrc")];

        assert_eq!(
            verify_candidates(ShellType::Bash, &candidates),
            VerificationResult::ConfigFileNotFound
        );
    }

    #[test]
    fn profile_without_block_is_not_configured() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let profile = temp_dir.path().join(".zshrc");
        std::fs::write(&profile, "export A=1\n").expect("write profile");

        assert_eq!(
            verify_candidates(ShellType::Zsh, &[profile]),
            VerificationResult::NotConfigured
        );
    }

    #[test]
    fn first_existing_candidate_is_checked() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let missing = temp_dir.path().join(".bashrc");
        let profile = temp_dir.path().join(".profile");
        std::fs::write(&profile, "# GOVER - Go version manager\nx\n# END GOVER\n")
            .expect("write profile");

        assert_eq!(
            verify_candidates(ShellType::Bash, &[missing, profile]),
            VerificationResult::Configured
        );
    }

    #[test]
    fn broken_block_is_an_error() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let profile = temp_dir.path().join(".bashrc");
        std::fs::write(&profile, "# GOVER - Go version manager\nx\n").expect("write profile");

        assert!(matches!(
            verify_candidates(ShellType::Bash, &[profile]),
            VerificationResult::Error(_)
        ));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn cmd_is_unsupported_off_windows() {
        assert_eq!(
            verify_shell_config(ShellType::Cmd, Path::new("/data/bin")),
            VerificationResult::Unsupported
        );
    }
}
