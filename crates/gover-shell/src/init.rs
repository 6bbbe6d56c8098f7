use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::ShellConfig;
use crate::detect::ShellType;
use crate::error::ShellError;
use crate::wrapper::CMD_WRAPPER_NAME;

/// Where the managed block (or cmd wrapper) was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub path: PathBuf,
    /// An earlier block or wrapper was replaced.
    pub replaced: bool,
}

/// Install the managed block into the shell's startup file, or write the cmd
/// wrapper into `bin_path`.
pub fn initialize(shell: ShellType, bin_path: &Path, force: bool) -> Result<InitOutcome, ShellError> {
    if shell == ShellType::Cmd {
        return initialize_cmd_wrapper(bin_path, force);
    }

    let profile = shell.config_file().ok_or(ShellError::NoConfigFile {
        shell: shell.display_name(),
    })?;
    initialize_profile(shell, &profile, bin_path, force)
}

/// Install the managed block into `profile`.
///
/// Without `force`, a profile that already has a block is left byte-for-byte
/// untouched. When `profile` is a symlink the link is kept and its target is
/// edited.
pub fn initialize_profile(
    shell: ShellType,
    profile: &Path,
    bin_path: &Path,
    force: bool,
) -> Result<InitOutcome, ShellError> {
    let target = gover_platform::resolve_write_target(profile)
        .map_err(|error| ShellError::io("failed to resolve", profile, error))?;
    let dir = parent_dir(&target);
    fs::create_dir_all(dir)
        .map_err(|error| ShellError::io("failed to create directory", dir, error))?;
    let _probe = ProbeFile::create(dir)?;

    let mut config = ShellConfig::load(shell, profile.to_path_buf())?;
    let replaced = config.has_init();
    if replaced && !force {
        return Err(ShellError::AlreadyConfigured {
            shell: shell.display_name(),
            name: shell.name(),
            path: profile.to_path_buf(),
        });
    }

    let edit = config.add_init(&shell.setup_commands(bin_path))?;
    debug!("{}", edit.diff_preview().trim_end());
    config.apply_edit(&edit)?;
    info!(
        "Wrote {} integration to {} (replaced: {replaced})",
        shell.display_name(),
        profile.display()
    );

    Ok(InitOutcome {
        path: profile.to_path_buf(),
        replaced,
    })
}

fn initialize_cmd_wrapper(bin_path: &Path, force: bool) -> Result<InitOutcome, ShellError> {
    fs::create_dir_all(bin_path)
        .map_err(|error| ShellError::io("failed to create directory", bin_path, error))?;
    let _probe = ProbeFile::create(bin_path)?;

    let path = bin_path.join(CMD_WRAPPER_NAME);
    let replaced = path.exists();
    if replaced && !force {
        return Err(ShellError::WrapperExists { path });
    }

    let newline = ShellType::Cmd.line_ending();
    let mut script = ShellType::Cmd.setup_commands(bin_path).join(newline);
    script.push_str(newline);
    gover_platform::write_atomic(&path, script.as_bytes())
        .map_err(|error| ShellError::io("failed to write", &path, error))?;
    info!("Wrote cmd wrapper {}", path.display());

    Ok(InitOutcome { path, replaced })
}

/// Remove the managed block from the shell's startup file, or delete the cmd
/// wrapper. Returns the path that was changed, if any.
pub fn deinitialize(shell: ShellType, bin_path: &Path) -> Result<Option<PathBuf>, ShellError> {
    if shell == ShellType::Cmd {
        let path = bin_path.join(CMD_WRAPPER_NAME);
        return match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed cmd wrapper {}", path.display());
                Ok(Some(path))
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(ShellError::io("failed to remove", &path, error)),
        };
    }

    let profile = shell.config_file().ok_or(ShellError::NoConfigFile {
        shell: shell.display_name(),
    })?;
    deinitialize_profile(shell, &profile)
}

pub fn deinitialize_profile(shell: ShellType, profile: &Path) -> Result<Option<PathBuf>, ShellError> {
    if !profile.exists() {
        return Ok(None);
    }

    let mut config = ShellConfig::load(shell, profile.to_path_buf())?;
    let edit = config.remove_init()?;
    if !edit.has_changes() {
        return Ok(None);
    }

    config.apply_edit(&edit)?;
    info!("Removed {} integration from {}", shell.display_name(), profile.display());
    Ok(Some(profile.to_path_buf()))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Proves the directory is writable before the profile is touched. The file
/// is removed when the guard drops.
struct ProbeFile {
    path: PathBuf,
}

impl ProbeFile {
    fn create(dir: &Path) -> Result<Self, ShellError> {
        let path = dir.join(format!(".gover-write-probe-{}", std::process::id()));
        fs::write(&path, b"").map_err(|source| ShellError::PermissionProbe {
            dir: dir.to_path_buf(),
            source,
        })?;
        Ok(Self { path })
    }
}

impl Drop for ProbeFile {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_file(&self.path) {
            debug!("Failed to remove probe file {}: {error}", self.path.display());
        }
    }
}
