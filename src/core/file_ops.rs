//! Copy and move primitives for single directory entries
//!
//! Both operations work on one entry (file, directory or symlink) and apply
//! the same policy when something with the same name already exists at the
//! destination:
//!
//! - file onto file: the destination file is replaced
//! - directory onto directory: contents are merged, recursively
//! - file onto directory or directory onto file: the existing entry is
//!   removed and replaced
//!
//! Copies keep permissions and access/modification times. Moves use a
//! rename and fall back to copy-then-delete when the rename is refused
//! (typically across filesystems).

use filetime::FileTime;
use log::{debug, trace};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copy `source` to `dest`, preserving file metadata
pub fn copy_entry(source: &Path, dest: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(source)?;

    if meta.file_type().is_symlink() {
        replace_conflicting(dest, false)?;
        return copy_symlink(source, dest);
    }

    if meta.is_dir() {
        refuse_nested(source, dest)?;
        copy_dir_with_metadata(source, dest)
    } else {
        replace_conflicting(dest, false)?;
        copy_file_with_metadata(source, dest, &meta)
    }
}

/// Move `source` to `dest`
pub fn move_entry(source: &Path, dest: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(source)?;
    let is_dir = meta.is_dir();
    if is_dir {
        refuse_nested(source, dest)?;
    }

    if is_dir && dest.is_dir() && !is_symlink(dest) {
        return merge_move_dir(source, dest);
    }

    replace_conflicting(dest, is_dir)?;

    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(
                "rename {} -> {} failed ({}), falling back to copy + delete",
                source.display(),
                dest.display(),
                e
            );
            copy_entry(source, dest)?;
            if is_dir {
                fs::remove_dir_all(source)
            } else {
                fs::remove_file(source)
            }
        }
    }
}

/// Move every child of `source` into the existing directory `dest`, then
/// drop the emptied `source`.
fn merge_move_dir(source: &Path, dest: &Path) -> io::Result<()> {
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        move_entry(&entry.path(), &dest.join(entry.file_name()))?;
    }
    fs::remove_dir(source)
}

/// Fail when `dest` lies inside the directory `source`
///
/// Copying or moving a folder into itself would walk into the entries it is
/// creating, so it is rejected before anything is written.
fn refuse_nested(source: &Path, dest: &Path) -> io::Result<()> {
    let source = source.canonicalize()?;
    if canonicalize_partial(dest).starts_with(&source) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Cannot transfer a folder into itself: {}", source.display()),
        ));
    }
    Ok(())
}

/// Canonical form of `path`, resolving through its deepest existing ancestor
/// when the path itself does not exist yet.
fn canonicalize_partial(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(resolved) = current.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, part| acc.join(part));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Remove whatever sits at `dest` if it cannot be overwritten in place by an
/// entry of the given kind.
fn replace_conflicting(dest: &Path, incoming_is_dir: bool) -> io::Result<()> {
    let existing = match fs::symlink_metadata(dest) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if existing.file_type().is_symlink() {
        trace!("Replacing existing symlink {}", dest.display());
        return remove_symlink(dest);
    }

    match (existing.is_dir(), incoming_is_dir) {
        (true, false) => fs::remove_dir_all(dest),
        (false, true) => fs::remove_file(dest),
        // Same kind: rename/copy overwrites a file, directories are merged
        _ => Ok(()),
    }
}

fn copy_file_with_metadata(source: &Path, dest: &Path, meta: &Metadata) -> io::Result<()> {
    // fs::copy carries the permission bits over
    fs::copy(source, dest)?;
    copy_timestamps(dest, meta)
}

fn copy_dir_with_metadata(source: &Path, dest: &Path) -> io::Result<()> {
    replace_conflicting(dest, true)?;
    fs::create_dir_all(dest)?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(walkdir_to_io)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            replace_conflicting(&target, false)?;
            copy_symlink(entry.path(), &target)?;
        } else if file_type.is_dir() {
            replace_conflicting(&target, true)?;
            fs::create_dir_all(&target)?;
        } else {
            replace_conflicting(&target, false)?;
            let meta = entry.metadata().map_err(walkdir_to_io)?;
            copy_file_with_metadata(entry.path(), &target, &meta)?;
        }
    }

    // Directory times change while their children are written, so restore
    // them last, innermost first.
    for entry in WalkDir::new(source).contents_first(true) {
        let entry = entry.map_err(walkdir_to_io)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dest.join(relative);
        let meta = entry.metadata().map_err(walkdir_to_io)?;

        let _ = fs::set_permissions(&target, meta.permissions());
        if let Err(e) = copy_timestamps(&target, &meta) {
            // Not every platform lets us stamp directories
            debug!("Could not set times on {}: {}", target.display(), e);
        }
    }

    Ok(())
}

fn copy_timestamps(dest: &Path, meta: &Metadata) -> io::Result<()> {
    let mtime = FileTime::from_last_modification_time(meta);
    let atime = FileTime::from_last_access_time(meta);
    filetime::set_file_times(dest, atime, mtime)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    let target = fs::read_link(source)?;
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    let meta = fs::metadata(source)?;
    if meta.is_dir() {
        copy_dir_with_metadata(source, dest)
    } else {
        copy_file_with_metadata(source, dest, &meta)
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn remove_symlink(path: &Path) -> io::Result<()> {
    // Windows directory symlinks are removed like directories
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

fn walkdir_to_io(err: walkdir::Error) -> io::Error {
    let message = err.to_string();
    err.into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message))
}
