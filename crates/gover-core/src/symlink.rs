//! Replace-in-place symlinks for the system-wide `go` link.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Point `link` at `target`.
///
/// A fresh link is created under a temporary sibling name and renamed over
/// `link`. When the rename cannot replace the existing entry, that entry is
/// removed and the rename retried once.
pub fn create(target: &Path, link: &Path) -> io::Result<()> {
    let parent = link
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let temp = TempLink::create(target, &temp_sibling(link))?;

    if let Err(first) = fs::rename(&temp.path, link) {
        log::debug!(
            "Rename over {} failed ({first}); removing existing entry",
            link.display()
        );
        remove_existing(link)?;
        fs::rename(&temp.path, link)?;
    }

    temp.disarm();
    Ok(())
}

/// Raw target of `link`, with relative targets anchored at the link's parent.
pub fn read_link(link: &Path) -> io::Result<PathBuf> {
    let target = fs::read_link(link)?;
    if target.is_absolute() {
        return Ok(target);
    }
    Ok(link
        .parent()
        .map_or_else(|| target.clone(), |parent| parent.join(&target)))
}

fn temp_sibling(link: &Path) -> PathBuf {
    let name = link
        .file_name()
        .map_or_else(|| "link".into(), |name| name.to_string_lossy().into_owned());
    let unique = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    link.with_file_name(format!(".{name}.tmp-{}-{unique}", std::process::id()))
}

fn remove_existing(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(error),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Temporary link removed on drop unless disarmed.
struct TempLink {
    path: PathBuf,
    armed: bool,
}

impl TempLink {
    fn create(target: &Path, path: &Path) -> io::Result<Self> {
        symlink_file(target, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            armed: true,
        })
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempLink {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
