//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation and
//! the runtime configuration derived from it.

use crate::bundler::Task;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Task to run, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskArg {
    /// cleanall, langchain, zip and put, in order
    All,
    /// List tasks with a one-line description
    Help,
    /// Remove build, dist and egg-info directories
    Clean,
    /// Run clean, then remove the bundle directory and archive
    Cleanall,
    /// Install the project and pinned packages into the bundle directory
    Langchain,
    /// Zip the bundle directory into <bundle>.zip
    Zip,
    /// Copy the archive to the stage, overwriting any existing file
    Put,
}

impl TaskArg {
    /// The pipeline task this argument names, if it names exactly one.
    pub fn task(self) -> Option<Task> {
        match self {
            TaskArg::All | TaskArg::Help => None,
            TaskArg::Clean => Some(Task::Clean),
            TaskArg::Cleanall => Some(Task::CleanAll),
            TaskArg::Langchain => Some(Task::Install),
            TaskArg::Zip => Some(Task::Archive),
            TaskArg::Put => Some(Task::Publish),
        }
    }
}

/// Package a Python project with pinned LangChain dependencies for a Snowflake notebook
#[derive(Parser, Debug)]
#[command(
    name = "snowpoc_bundler",
    version,
    about = "Package a Python project with pinned LangChain dependencies and publish it to a Snowflake stage",
    long_about = "Installs the current project plus a pinned set of LangChain packages into a bundle
directory (source-only, no dependency resolution), zips it, and copies the zip to a
Snowflake stage with `snow stage copy --overwrite`.

Usage:
  snowpoc_bundler                 # cleanall, langchain, zip, put
  snowpoc_bundler zip             # everything up to and including zip
  snowpoc_bundler put --only      # upload an existing langchain.zip
  snowpoc_bundler help            # list tasks

Settings are read from snowpoc.toml in the workspace when present.
Exit code 0 = every task completed; otherwise the exit code of the failing tool."
)]
pub struct Args {
    /// Task to run
    #[arg(value_enum, default_value_t = TaskArg::All, value_name = "TASK")]
    pub task: TaskArg,

    /// Run only the named task, skipping its prerequisites
    #[arg(long)]
    pub only: bool,

    /// Project root containing setup.py / pyproject.toml
    #[arg(short = 'C', long, value_name = "DIR", env = "SNOWPOC_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// Settings file (default: <workspace>/snowpoc.toml if present)
    #[arg(short = 'c', long, value_name = "PATH", env = "SNOWPOC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bundle directory name; the archive is <NAME>.zip
    #[arg(long, value_name = "NAME", env = "SNOWPOC_BUNDLE_NAME")]
    pub bundle_name: Option<String>,

    /// Stage receiving the archive, e.g. @langchain_stage
    #[arg(long, value_name = "STAGE", env = "SNOWPOC_STAGE")]
    pub stage: Option<String>,

    /// Snowflake CLI connection profile
    #[arg(long, value_name = "NAME", env = "SNOWPOC_CONNECTION")]
    pub connection: Option<String>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Show verbose progress
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.only && self.task.task().is_none() {
            return Err("--only needs a single task (clean, cleanall, langchain, zip or put)".into());
        }
        for (flag, value) in [
            ("--bundle-name", &self.bundle_name),
            ("--stage", &self.stage),
            ("--connection", &self.connection),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(format!("{flag} cannot be empty"));
            }
        }
        Ok(())
    }

    /// The tasks to execute, in order. Empty for `help`.
    pub fn plan(&self) -> Vec<Task> {
        match self.task {
            TaskArg::Help => Vec::new(),
            TaskArg::All => crate::bundler::default_pipeline(),
            other => other
                .task()
                .map(|task| task.plan(!self.only))
                .unwrap_or_default(),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
    /// Emit JSON instead of text summaries
    json: bool,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        // JSON output owns stdout
        let quiet = args.quiet || args.json;
        Self {
            output: super::OutputManager::new(args.verbose, quiet),
            json: args.json,
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Whether the run report should be printed as JSON
    pub fn json(&self) -> bool {
        self.json
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print error message
    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
