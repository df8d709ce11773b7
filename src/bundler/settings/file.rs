//! `snowpoc.toml` settings file.
//!
//! ```toml
//! [bundle]
//! name = "langchain"
//!
//! [stage]
//! name = "@langchain_stage"
//! connection = "default"
//!
//! [install]
//! project = "."
//! project_name = "langchain-snowpoc"
//! packages = ["langchain==0.3.1", "langsmith==0.1.129"]
//!
//! [clean]
//! patterns = ["build", "dist", "*.egg-info"]
//!
//! [tools]
//! pip = ["python3", "-m", "pip"]
//! snow = ["snow"]
//! timeout_secs = 1800
//! ```
//!
//! Every key is optional; unknown keys are rejected so typos surface early.

use super::{PinnedPackage, SettingsBuilder, ToolCommand};
use crate::bundler::error::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Conventional settings file name at the workspace root.
pub const SETTINGS_FILE_NAME: &str = "snowpoc.toml";

/// Parsed settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    /// `[bundle]`
    pub bundle: BundleSection,
    /// `[stage]`
    pub stage: StageSection,
    /// `[install]`
    pub install: InstallSection,
    /// `[clean]`
    pub clean: CleanSection,
    /// `[tools]`
    pub tools: ToolsSection,
}

/// `[bundle]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleSection {
    /// Bundle directory name; the archive is `<name>.zip`.
    pub name: Option<String>,
}

/// `[stage]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageSection {
    /// Stage receiving the archive, e.g. `@langchain_stage`.
    pub name: Option<String>,
    /// Snowflake CLI connection profile.
    pub connection: Option<String>,
}

/// `[install]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallSection {
    /// Install spec for the current project, usually `.`.
    pub project: Option<String>,
    /// Distribution name of the project, when it cannot be detected.
    pub project_name: Option<String>,
    /// Exact `name==version` pins, replacing the defaults.
    pub packages: Option<Vec<String>>,
}

/// `[clean]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanSection {
    /// Glob patterns relative to the workspace.
    pub patterns: Option<Vec<String>>,
}

/// `[tools]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    /// Installer argv prefix.
    pub pip: Option<Vec<String>>,
    /// Snowflake CLI argv prefix.
    pub snow: Option<Vec<String>>,
    /// Per-invocation time budget in seconds.
    pub timeout_secs: Option<u64>,
}

impl SettingsFile {
    /// Parses settings from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| Error::InvalidSettings(format!("{SETTINGS_FILE_NAME}: {e}")))
    }

    /// Layers the file's values onto a builder.
    ///
    /// Values already set on the builder are overwritten, so callers apply the
    /// file first and command-line overrides afterwards.
    pub fn apply(self, mut builder: SettingsBuilder) -> Result<SettingsBuilder> {
        if let Some(name) = self.bundle.name {
            builder = builder.bundle_name(name);
        }
        if let Some(stage) = self.stage.name {
            builder = builder.stage(stage);
        }
        if let Some(connection) = self.stage.connection {
            builder = builder.connection(connection);
        }
        if let Some(project) = self.install.project {
            builder = builder.project_spec(project);
        }
        if let Some(project_name) = self.install.project_name {
            builder = builder.project_name(project_name);
        }
        if let Some(packages) = self.install.packages {
            let pins = packages
                .iter()
                .map(|spec| spec.parse::<PinnedPackage>())
                .collect::<Result<Vec<_>>>()?;
            builder = builder.packages(pins);
        }
        if let Some(patterns) = self.clean.patterns {
            builder = builder.clean_patterns(patterns);
        }
        if let Some(pip) = self.tools.pip {
            builder = builder.pip(ToolCommand::from_argv(pip)?);
        }
        if let Some(snow) = self.tools.snow {
            builder = builder.snow(ToolCommand::from_argv(snow)?);
        }
        if let Some(secs) = self.tools.timeout_secs {
            if secs == 0 {
                return Err(Error::InvalidSettings(
                    "tools.timeout_secs must be positive".into(),
                ));
            }
            builder = builder.tool_timeout(Duration::from_secs(secs));
        }
        Ok(builder)
    }
}
