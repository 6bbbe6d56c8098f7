use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MAX_LINK_HOPS: usize = 40;

/// Follow `path` through any chain of symlinks to the file that should
/// receive the bytes. Dangling links resolve to their missing target.
///
/// # Errors
/// Returns an error when a link cannot be read or the chain loops.
pub fn resolve_write_target(path: &Path) -> io::Result<PathBuf> {
    let mut current = path.to_path_buf();

    for _ in 0..MAX_LINK_HOPS {
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                let target = fs::read_link(&current)?;
                current = match current.parent() {
                    Some(parent) if target.is_relative() => parent.join(target),
                    _ => target,
                };
            }
            Ok(_) => return Ok(current),
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(current),
            Err(error) => return Err(error),
        }
    }

    Err(io::Error::other(format!(
        "too many levels of symbolic links at {}",
        path.display()
    )))
}

/// Replace the contents of `path` through a temp file renamed over the final
/// target. Symlinks on the way stay links, missing parents are created and
/// existing permissions are carried over.
///
/// # Errors
/// Returns an error if the target cannot be resolved, written or replaced.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let target = resolve_write_target(path)?;
    let parent = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(&target) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(&target).map_err(|error| error.error)?;
    Ok(())
}
