//! Main pipeline orchestration and coordination.
//!
//! This module provides the [`Pipeline`] that runs packaging tasks in order,
//! stopping at the first failure.

use crate::bundler::{
    Settings,
    error::{Error, Result},
    tasks::{
        self, PackageInstaller, StageUploader, Task, TaskOutcome, TaskStatus,
        archive::ArchiveSummary,
    },
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// Progress notifications emitted while a plan runs.
#[derive(Debug)]
pub enum TaskEvent<'a> {
    /// A task is about to run.
    Started(Task),
    /// A task completed.
    Finished(&'a TaskOutcome),
    /// A task failed; nothing after it will run.
    Failed(Task, &'a Error),
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last task finished.
    pub finished_at: DateTime<Utc>,
    /// One entry per executed task, in order.
    pub tasks: Vec<TaskOutcome>,
}

impl RunReport {
    /// The most recent archive produced or uploaded during the run.
    pub fn archive(&self) -> Option<&ArchiveSummary> {
        self.tasks.iter().rev().find_map(|t| t.archive.as_ref())
    }
}

/// Main packaging orchestrator.
///
/// Owns the settings and the two external seams: the installer used by
/// Install and the uploader used by Publish. Tests substitute fakes for both.
///
/// # Examples
///
/// ```no_run
/// use snowpoc_bundler::bundler::{
///     Pipeline, PipInstaller, SettingsBuilder, SnowCliUploader, default_pipeline,
/// };
///
/// # async fn example() -> snowpoc_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new().workspace(".").build()?;
/// let pipeline = Pipeline::new(
///     PipInstaller::from_settings(&settings),
///     SnowCliUploader::from_settings(&settings),
///     settings,
/// );
///
/// let report = pipeline.run(&default_pipeline()).await?;
/// if let Some(archive) = report.archive() {
///     println!("Published {} (sha256 {})", archive.path.display(), archive.sha256);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline<I, U> {
    settings: Settings,
    installer: I,
    uploader: U,
}

impl<I: PackageInstaller, U: StageUploader> Pipeline<I, U> {
    /// Creates a pipeline from its collaborators and settings.
    pub fn new(installer: I, uploader: U, settings: Settings) -> Self {
        Self {
            settings,
            installer,
            uploader,
        }
    }

    /// Returns a reference to the pipeline settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the installer used by Install.
    pub fn installer(&self) -> &I {
        &self.installer
    }

    /// Returns the uploader used by Publish.
    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Runs `plan` in order, stopping at the first failure.
    pub async fn run(&self, plan: &[Task]) -> Result<RunReport> {
        self.run_with(plan, |_| {}).await
    }

    /// Runs `plan` in order, reporting progress to `on_event`.
    ///
    /// Fail-fast: the first failing task ends the run with
    /// [`Error::TaskFailed`]. Nothing is rolled back; artifacts of earlier
    /// tasks stay on disk.
    pub async fn run_with<F>(&self, plan: &[Task], mut on_event: F) -> Result<RunReport>
    where
        F: FnMut(TaskEvent<'_>),
    {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(plan.len());

        for &task in plan {
            on_event(TaskEvent::Started(task));
            log::debug!("Starting task `{}`", task);

            match self.run_task(task).await {
                Ok(mut outcome) => {
                    carry_entry_counts(&mut outcome, &outcomes);
                    log::debug!("Finished task `{}` in {}ms", task, outcome.elapsed_ms);
                    on_event(TaskEvent::Finished(&outcome));
                    outcomes.push(outcome);
                }
                Err(error) => {
                    log::error!("Task `{}` failed: {}", task, error);
                    on_event(TaskEvent::Failed(task, &error));
                    return Err(Error::TaskFailed {
                        task: task.name(),
                        source: Box::new(error),
                    });
                }
            }
        }

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            tasks: outcomes,
        })
    }

    /// Runs a single task without its prerequisites.
    pub async fn run_task(&self, task: Task) -> Result<TaskOutcome> {
        let start = Instant::now();
        let settings = &self.settings;

        let (status, detail, archive) = match task {
            Task::Clean => {
                let removed = tasks::clean::clean(settings).await?;
                removal_result(&removed, "no build artifacts present")
            }
            Task::CleanAll => {
                let removed = tasks::clean::clean_all(settings).await?;
                removal_result(&removed, "workspace already clean")
            }
            Task::Install => {
                let installed = tasks::install::install(settings, &self.installer).await?;
                let detail = format!(
                    "installed {} distribution(s) into {}",
                    installed.len(),
                    settings.bundle_name()
                );
                (TaskStatus::Done, detail, None)
            }
            Task::Archive => {
                let summary = tasks::archive::archive(settings).await?;
                let detail = format!(
                    "{} ({} files, {} bytes)",
                    settings.archive_name(),
                    summary.files.unwrap_or_default(),
                    summary.size
                );
                (TaskStatus::Done, detail, Some(summary))
            }
            Task::Publish => {
                let summary = tasks::publish::publish(settings, &self.uploader).await?;
                let detail = format!(
                    "{} -> {} (connection `{}`)",
                    settings.archive_name(),
                    settings.stage().name,
                    settings.stage().connection
                );
                (TaskStatus::Done, detail, Some(summary))
            }
        };

        Ok(TaskOutcome {
            task,
            status,
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            detail,
            archive,
        })
    }
}

/// Fills in entry counts for an archive that an earlier task of the same run
/// built, matched by checksum.
fn carry_entry_counts(outcome: &mut TaskOutcome, earlier: &[TaskOutcome]) {
    let Some(summary) = outcome.archive.as_mut() else {
        return;
    };
    if summary.files.is_some() {
        return;
    }
    let built = earlier
        .iter()
        .rev()
        .filter_map(|o| o.archive.as_ref())
        .find(|a| a.sha256 == summary.sha256 && a.files.is_some());
    if let Some(built) = built {
        summary.files = built.files;
        summary.directories = built.directories;
    }
}

fn removal_result(
    removed: &[std::path::PathBuf],
    nothing: &str,
) -> (TaskStatus, String, Option<ArchiveSummary>) {
    if removed.is_empty() {
        (TaskStatus::NoOp, nothing.to_string(), None)
    } else {
        let names: Vec<_> = removed
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        (TaskStatus::Done, format!("removed {}", names.join(", ")), None)
    }
}
