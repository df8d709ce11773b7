//! External tool commands.

use crate::bundler::error::{Error, Result};
use std::{fmt, time::Duration};

/// Default time budget for a single external tool invocation (30 minutes).
///
/// Source-only installs build every package from its sdist, which is slow on
/// a cold cache.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(1800);

/// A program plus leading arguments, e.g. `python3 -m pip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    /// Command consisting of a bare program name or path.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builds a command from an argv prefix. The first element is the program.
    pub fn from_argv<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::InvalidSettings("tool command cannot be empty".into()))?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    /// Program name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Leading arguments placed before task-specific ones.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Commands used for installing and uploading.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Python package installer, invoked as `<pip> install ...`.
    pub pip: ToolCommand,

    /// Snowflake CLI, invoked as `<snow> stage copy ...`.
    pub snow: ToolCommand,

    /// Per-invocation timeout.
    pub timeout: Duration,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            pip: ToolCommand::new("pip"),
            snow: ToolCommand::new("snow"),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}
