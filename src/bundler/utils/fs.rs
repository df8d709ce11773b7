//! File system utilities for bundling.
//!
//! Removal helpers treat a missing target as success, which makes Clean and
//! CleanAll safe to repeat.

use crate::bundler::error::{ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// What a removal actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The path existed and is now gone.
    Removed,
    /// Nothing was there.
    Absent,
}

/// Removes a directory tree, a file or a symlink if it exists.
///
/// Symlinks are removed themselves, never followed.
pub async fn remove_path(path: &Path) -> Result<Removal> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Removal::Absent),
        Err(e) => return Err(e).fs_context("inspecting", path),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(Removal::Removed),
        // Raced with something else removing it
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Removal::Absent),
        Err(e) => Err(e).fs_context("removing", path),
    }
}

/// Creates all of the directories of the specified path.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Returns true if `path` is a directory with at least one entry.
pub async fn dir_has_entries(path: &Path) -> Result<bool> {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e).fs_context("reading directory", path),
    };
    Ok(entries
        .next_entry()
        .await
        .fs_context("reading directory", path)?
        .is_some())
}
