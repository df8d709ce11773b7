//! Error types for bundling operations.
//!
//! Every task surfaces its failure through [`Error`]. Failures of external
//! tools keep the tool's exit code so the binary can propagate it.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the packaging tasks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error with the operation and path that triggered it.
    #[error("{context} {}: {source}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Plain I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Zip writer or reader error.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal error.
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Invalid clean pattern.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A pinned package is not an exact `name==version` pin.
    #[error("Invalid package pin `{spec}`: {reason}")]
    InvalidPin {
        /// The offending spec as written
        spec: String,
        /// Why it was rejected
        reason: String,
    },

    /// An external tool could not be located.
    #[error("`{tool}` not found: {source}")]
    ToolNotFound {
        /// Program name as configured
        tool: String,
        /// Lookup error
        #[source]
        source: which::Error,
    },

    /// An external tool ran and reported failure.
    #[error("`{command}` failed with {}{}", exit_description(*code), stderr_summary(stderr_tail))]
    ToolFailed {
        /// Command line that was run
        command: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Last lines the tool wrote to stderr
        stderr_tail: Vec<String>,
    },

    /// An external tool exceeded its time budget and was killed.
    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    ToolTimeout {
        /// Command line that was run
        command: String,
        /// Configured timeout
        timeout: Duration,
    },

    /// Install found a bundle directory left over from an earlier run.
    #[error(
        "Bundle directory {} already has content; run `cleanall` before installing",
        .0.display()
    )]
    StaleBundle(PathBuf),

    /// Archive was asked to compress a missing or empty directory.
    #[error("Bundle directory {} is missing or empty; run `langchain` first", .0.display())]
    EmptyBundle(PathBuf),

    /// Publish was asked to upload an archive that does not exist.
    #[error("Archive {} does not exist; run `zip` first", .0.display())]
    MissingArchive(PathBuf),

    /// The installed set is not exactly the pins plus the project.
    #[error("Bundle contents violate the pinned package set: {}", .0.join("; "))]
    UnexpectedContents(Vec<String>),

    /// A pipeline task failed.
    #[error("Task `{task}` failed: {source}")]
    TaskFailed {
        /// Task name
        task: &'static str,
        /// The task's error
        #[source]
        source: Box<Error>,
    },

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn stderr_summary(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!(":\n  {}", lines.join("\n  "))
    }
}

impl Error {
    /// Process exit code for this error.
    ///
    /// A failed external tool passes its own non-zero code through; every
    /// other failure maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ToolFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            Error::TaskFailed { source, .. } => source.exit_code(),
            _ => 1,
        }
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}

/// Attach a message to a failure, turning it into a bundler [`Error`].
pub trait Context<T> {
    /// Wrap the failure with a static message.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Wrap the failure with a lazily built message.
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

/// Filesystem context for I/O results.
pub trait ErrorExt<T> {
    /// Attach the operation and path to an I/O error.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for io::Result<T> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}
