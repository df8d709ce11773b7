//! Packaging pipeline: clean, install, archive and publish.
//!
//! # Overview
//!
//! The bundler:
//! 1. Reads configuration from [`Settings`]
//! 2. Expands the requested [`Task`] into its prerequisite chain
//! 3. Runs each task in order through the [`Pipeline`], stopping at the first
//!    failure
//! 4. Returns a [`RunReport`] with per-task outcomes and archive checksum

pub mod builder;
pub mod error;
pub mod inspect;
pub mod settings;
pub mod tasks;
pub mod utils;

pub use builder::{Pipeline, RunReport, TaskEvent};
pub use error::{Error, Result};
pub use settings::{
    PinnedPackage, Settings, SettingsBuilder, SettingsFile, StageSettings, ToolCommand,
};
pub use tasks::{
    ArchiveSummary, InstallRequest, PackageInstaller, PipInstaller, SnowCliUploader,
    StageUploader, Task, TaskOutcome, TaskStatus, default_pipeline,
};
