//! The packaging tasks and their dependency chain.
//!
//! ```text
//! put ──▶ zip ──▶ langchain ──▶ cleanall (runs clean first)
//! ```
//!
//! Each task is a plain async function over [`Settings`]; the
//! [`Pipeline`](crate::bundler::Pipeline) strings them together.
//!
//! [`Settings`]: crate::bundler::Settings

pub mod archive;
pub mod clean;
pub mod install;
pub mod publish;

pub use archive::{ArchiveSummary, create_archive};
pub use install::{InstallRequest, PackageInstaller, PipInstaller};
pub use publish::{SnowCliUploader, StageUploader};

use crate::bundler::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A named step of the packaging pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Remove build, dist and egg-info directories.
    Clean,
    /// Clean, then remove the bundle directory and archive.
    CleanAll,
    /// Install the project and the pinned packages into the bundle directory.
    Install,
    /// Zip the bundle directory.
    Archive,
    /// Copy the archive to the stage.
    Publish,
}

impl Task {
    /// All tasks in pipeline order.
    pub const ALL: [Task; 5] = [
        Task::Clean,
        Task::CleanAll,
        Task::Install,
        Task::Archive,
        Task::Publish,
    ];

    /// Command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Task::Clean => "clean",
            Task::CleanAll => "cleanall",
            Task::Install => "langchain",
            Task::Archive => "zip",
            Task::Publish => "put",
        }
    }

    /// One-line description for `help`.
    pub fn description(self) -> &'static str {
        match self {
            Task::Clean => "Remove build, dist and egg-info directories",
            Task::CleanAll => "Run clean, then remove the bundle directory and archive",
            Task::Install => "Install the project and pinned packages into the bundle directory",
            Task::Archive => "Zip the bundle directory into <bundle>.zip",
            Task::Publish => "Copy the archive to the stage, overwriting any existing file",
        }
    }

    /// The task that must complete before this one.
    ///
    /// CleanAll has none because it runs Clean itself.
    pub fn prerequisite(self) -> Option<Task> {
        match self {
            Task::Clean | Task::CleanAll => None,
            Task::Install => Some(Task::CleanAll),
            Task::Archive => Some(Task::Install),
            Task::Publish => Some(Task::Archive),
        }
    }

    /// Tasks to run for this target, in execution order.
    ///
    /// With `with_prerequisites` the whole chain leading to `self` is
    /// included, the way `make put` builds everything `put` depends on.
    pub fn plan(self, with_prerequisites: bool) -> Vec<Task> {
        let mut plan = vec![self];
        if with_prerequisites {
            let mut current = self;
            while let Some(prerequisite) = current.prerequisite() {
                plan.push(prerequisite);
                current = prerequisite;
            }
            plan.reverse();
        }
        plan
    }
}

/// The `all` pipeline: CleanAll → Install → Archive → Publish.
pub fn default_pipeline() -> Vec<Task> {
    Task::Publish.plan(true)
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Task::ALL
            .into_iter()
            .find(|task| task.name() == name)
            .ok_or_else(|| {
                let names: Vec<_> = Task::ALL.iter().map(|t| t.name()).collect();
                Error::GenericError(format!(
                    "Unknown task `{name}`. Valid tasks: {}",
                    names.join(", ")
                ))
            })
    }
}

impl Serialize for Task {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Whether a task changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The task did its work.
    Done,
    /// The target state already held.
    NoOp,
}

/// Result of one completed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    /// Which task ran.
    pub task: Task,
    /// Whether it changed anything.
    pub status: TaskStatus,
    /// Wall-clock time in milliseconds.
    pub elapsed_ms: u64,
    /// Human-readable summary.
    pub detail: String,
    /// Archive produced or uploaded by this task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline_order() {
        assert_eq!(
            default_pipeline(),
            [Task::CleanAll, Task::Install, Task::Archive, Task::Publish]
        );
    }

    #[test]
    fn plans_follow_the_chain() {
        assert_eq!(Task::Clean.plan(true), [Task::Clean]);
        assert_eq!(Task::CleanAll.plan(true), [Task::CleanAll]);
        assert_eq!(
            Task::Archive.plan(true),
            [Task::CleanAll, Task::Install, Task::Archive]
        );
        assert_eq!(Task::Archive.plan(false), [Task::Archive]);
    }

    #[test]
    fn names_round_trip_and_unknown_is_rejected() {
        for task in Task::ALL {
            assert_eq!(task.name().parse::<Task>().unwrap(), task);
        }
        let err = "deploy".parse::<Task>().unwrap_err();
        assert!(err.to_string().contains("langchain"));
    }

    #[test]
    fn serializes_as_command_name() {
        assert_eq!(serde_json::to_string(&Task::Install).unwrap(), "\"langchain\"");
        assert_eq!(serde_json::to_string(&TaskStatus::NoOp).unwrap(), "\"no_op\"");
    }
}
