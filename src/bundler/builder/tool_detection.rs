//! External tool detection and availability checking.
//!
//! Resolves configured program names (`pip`, `snow`, or explicit paths) to
//! executables before anything is spawned, so a missing tool is reported as
//! such instead of as an opaque spawn error.

use crate::bundler::error::{Error, Result};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

/// Versions already logged, keyed by resolved path.
///
/// Cached to avoid repeated `--version` subprocess calls within one run.
static LOGGED_VERSIONS: LazyLock<Mutex<HashMap<PathBuf, Option<String>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Locates `program` on `PATH` (or checks it directly if it is a path).
pub async fn locate_tool(program: &str) -> Result<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());
            if log::log_enabled!(log::Level::Debug) {
                log_version_once(&path).await;
            }
            Ok(path)
        }
        Err(source) => {
            log::debug!("{} not found in PATH: {}", program, source);
            Err(Error::ToolNotFound {
                tool: program.to_string(),
                source,
            })
        }
    }
}

async fn log_version_once(path: &Path) {
    // Lock is not held across the probe
    let already_logged = LOGGED_VERSIONS
        .lock()
        .map(|logged| logged.contains_key(path))
        .unwrap_or(true);
    if already_logged {
        return;
    }

    let version = match tokio::process::Command::new(path)
        .arg("--version")
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::debug!("✓ {} available: {}", path.display(), version);
            Some(version)
        }
        Ok(output) => {
            log::debug!(
                "{} --version exited with {:?}; continuing anyway",
                path.display(),
                output.status.code()
            );
            None
        }
        Err(e) => {
            log::warn!(
                "{} found but failed to execute: {}. Check file permissions.",
                path.display(),
                e
            );
            None
        }
    };
    if let Ok(mut logged) = LOGGED_VERSIONS.lock() {
        logged.insert(path.to_path_buf(), version);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_shell() {
        assert!(locate_tool("sh").await.is_ok());
    }

    #[tokio::test]
    async fn version_probe_runs_once_per_path() {
        let path = locate_tool("sh").await.unwrap();
        log_version_once(&path).await;
        log_version_once(&path).await;
        assert!(LOGGED_VERSIONS.lock().unwrap().contains_key(&path));
    }

    #[tokio::test]
    async fn reports_missing_tool_by_name() {
        match locate_tool("no-such-snow-cli-binary").await {
            Err(Error::ToolNotFound { tool, .. }) => assert_eq!(tool, "no-such-snow-cli-binary"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
