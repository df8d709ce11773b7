//! Clean and CleanAll.

use crate::bundler::{
    Settings,
    error::{Context, Error, Result},
    utils::fs::{Removal, remove_path},
};
use std::path::{Path, PathBuf};

/// Removes build byproducts matching the configured clean patterns.
///
/// Returns the paths that were actually removed; an empty list means the
/// workspace was already clean.
pub async fn clean(settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for pattern in settings.clean_patterns() {
        for path in expand(settings.workspace(), pattern)? {
            if remove_path(&path).await? == Removal::Removed {
                log::info!("Removed {}", path.display());
                removed.push(path);
            }
        }
    }

    if removed.is_empty() {
        log::debug!("No build artifacts to remove");
    }
    Ok(removed)
}

/// Runs [`clean`], then removes the bundle directory and the archive.
pub async fn clean_all(settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut removed = clean(settings).await?;

    for path in [settings.bundle_dir(), settings.archive_path()] {
        if remove_path(&path).await? == Removal::Removed {
            log::info!("Removed {}", path.display());
            removed.push(path);
        }
    }

    Ok(removed)
}

/// Expands one clean pattern relative to the workspace.
fn expand(workspace: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let workspace = workspace
        .to_str()
        .context("workspace path is not valid UTF-8")?;
    let full = format!("{}/{}", glob::Pattern::escape(workspace), pattern);

    let mut matches = Vec::new();
    for entry in glob::glob(&full)? {
        matches.push(entry.map_err(|e| Error::IoError(e.into_error()))?);
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::SettingsBuilder;

    fn settings(dir: &Path) -> Settings {
        SettingsBuilder::new().workspace(dir).build().unwrap()
    }

    #[tokio::test]
    async fn removes_build_dist_and_egg_info() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["build/lib", "dist", "langchain_snowpoc.egg-info", "src"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }

        let removed = clean(&settings(dir.path())).await.unwrap();

        assert_eq!(removed.len(), 3);
        assert!(!dir.path().join("build").exists());
        assert!(!dir.path().join("dist").exists());
        assert!(!dir.path().join("langchain_snowpoc.egg-info").exists());
        assert!(dir.path().join("src").exists());
    }

    #[tokio::test]
    async fn repeated_clean_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        assert!(clean(&settings).await.unwrap().is_empty());
        assert!(clean_all(&settings).await.unwrap().is_empty());
        assert!(clean_all(&settings).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clean_all_removes_bundle_and_archive() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        std::fs::create_dir_all(settings.bundle_dir().join("langchain_core")).unwrap();
        std::fs::write(settings.archive_path(), b"PK").unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();

        let removed = clean_all(&settings).await.unwrap();

        assert_eq!(removed.len(), 3);
        assert!(!settings.bundle_dir().exists());
        assert!(!settings.archive_path().exists());
    }

    #[tokio::test]
    async fn workspace_with_glob_characters_is_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("proj[1]");
        std::fs::create_dir_all(workspace.join("build")).unwrap();

        let removed = clean(&settings(&workspace)).await.unwrap();
        assert_eq!(removed, [workspace.join("build")]);
    }
}
