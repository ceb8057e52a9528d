use crate::{
    artifact::ArtifactError,
    error::{Failure, attempt},
    value::Value,
};
use log::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

/// Prefix of artifact store directories.
pub const STORE_PREFIX: &str = "artifactStore-";

/// Allocate a fresh temporary artifact store.
///
/// The returned value deletes the whole directory tree when released.
///
/// # Errors
/// If the directory cannot be created.
pub fn artifact_store() -> Result<Value<PathBuf>, Failure> {
    let dir = attempt(|| tempfile::Builder::new().prefix(STORE_PREFIX).tempdir())?;
    let path = dir.keep();
    debug!("artifact store allocated at {}", path.display());
    Ok(Value::with_release(path, |path| {
        attempt(|| delete_tree(&path))
    }))
}

/// Recursively delete `dir` and everything below it.
///
/// Symbolic links are removed as links; their targets are never visited.
/// Stops at the first entry that cannot be visited or removed.
///
/// # Errors
/// The first walk or removal failure.
pub fn delete_tree(dir: &Path) -> Result<(), ArtifactError> {
    let walk = WalkDir::new(dir)
        .follow_links(false)
        .follow_root_links(false)
        .contents_first(true);
    for entry in walk {
        let entry = entry?;
        let path = entry.path();
        let removed = if removes_as_dir(&entry) {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        removed.map_err(|source| ArtifactError::io(path, source))?;
    }
    debug!("deleted {}", dir.display());
    Ok(())
}

/// Directories, and on Windows directory symlinks, need `remove_dir`.
///
/// Links are never followed, so `file_type` describes the link itself.
fn removes_as_dir(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if entry.path_is_symlink() {
        is_dir_link(file_type)
    } else {
        file_type.is_dir()
    }
}

#[cfg(windows)]
fn is_dir_link(file_type: fs::FileType) -> bool {
    use std::os::windows::fs::FileTypeExt;
    file_type.is_symlink_dir()
}

#[cfg(not(windows))]
fn is_dir_link(_: fs::FileType) -> bool {
    false
}
