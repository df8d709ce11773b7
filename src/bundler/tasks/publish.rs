//! Publish: copy the archive to a Snowflake stage.

use super::archive::ArchiveSummary;
use crate::bundler::{
    Settings,
    error::{Error, Result},
    settings::{StageSettings, ToolCommand},
    utils::process::run_tool,
};
use std::{
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

/// Uploads a local file to a stage, replacing any existing object.
pub trait StageUploader {
    /// Copies `archive` to `stage`. Last writer wins; no retry.
    fn upload(&self, archive: &Path, stage: &StageSettings) -> impl Future<Output = Result<()>>;
}

/// Uploads with `snow stage copy <archive> <stage> --overwrite --connection <name>`.
#[derive(Debug, Clone)]
pub struct SnowCliUploader {
    command: ToolCommand,
    workspace: PathBuf,
    timeout: Duration,
}

impl SnowCliUploader {
    /// Creates an uploader running `command` from `workspace`.
    pub fn new(command: ToolCommand, workspace: &Path, timeout: Duration) -> Self {
        Self {
            command,
            workspace: workspace.to_path_buf(),
            timeout,
        }
    }

    /// Creates an uploader from the configured tool settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.tools().snow.clone(),
            settings.workspace(),
            settings.tools().timeout,
        )
    }

    /// Arguments passed after the configured snow command.
    pub fn copy_args(archive: &Path, stage: &StageSettings) -> Vec<String> {
        vec![
            "stage".to_string(),
            "copy".to_string(),
            archive.display().to_string(),
            stage.name.clone(),
            "--overwrite".to_string(),
            "--connection".to_string(),
            stage.connection.clone(),
        ]
    }
}

impl StageUploader for SnowCliUploader {
    async fn upload(&self, archive: &Path, stage: &StageSettings) -> Result<()> {
        let args = Self::copy_args(archive, stage);
        run_tool(&self.command, &args, &self.workspace, self.timeout).await
    }
}

/// Runs Publish for `settings` with `uploader`.
///
/// # Errors
///
/// - [`Error::MissingArchive`] if `<bundle>.zip` does not exist
/// - whatever the uploader reports (authentication, network, unknown stage)
pub async fn publish<U: StageUploader>(settings: &Settings, uploader: &U) -> Result<ArchiveSummary> {
    let archive_path = settings.archive_path();
    match tokio::fs::metadata(&archive_path).await {
        Ok(metadata) if metadata.is_file() => {}
        _ => return Err(Error::MissingArchive(archive_path)),
    }

    let summary = ArchiveSummary::describe(&archive_path).await?;
    log::info!(
        "Uploading {} ({} bytes, sha256 {}) to {} via connection `{}`",
        archive_path.display(),
        summary.size,
        summary.sha256,
        settings.stage().name,
        settings.stage().connection
    );

    uploader.upload(&archive_path, settings.stage()).await?;

    log::info!("✓ Uploaded {} to {}", settings.archive_name(), settings.stage().name);
    Ok(summary)
}
