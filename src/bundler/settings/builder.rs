//! Builder for constructing Settings.

use super::{
    PinnedPackage, Settings, StageSettings, ToolCommand, ToolSettings, core::DEFAULT_BUNDLE_NAME,
    core::DEFAULT_CLEAN_PATTERNS, package::default_pins,
};
use crate::bundler::error::{Error, ErrorExt, Result};
use path_absolutize::Absolutize;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

/// Builder for constructing [`Settings`].
///
/// Every field has a default matching the notebook bundle, so
/// `SettingsBuilder::new().build()` packages the current directory.
///
/// # Examples
///
/// ```no_run
/// use snowpoc_bundler::bundler::{PinnedPackage, SettingsBuilder};
///
/// # fn example() -> snowpoc_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .workspace(".")
///     .packages(vec!["langchain==0.3.1".parse::<PinnedPackage>()?])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    workspace: Option<PathBuf>,
    bundle_name: Option<String>,
    stage: Option<String>,
    connection: Option<String>,
    project_spec: Option<String>,
    project_name: Option<String>,
    packages: Option<Vec<PinnedPackage>>,
    clean_patterns: Option<Vec<String>>,
    pip: Option<ToolCommand>,
    snow: Option<ToolCommand>,
    tool_timeout: Option<Duration>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the workspace root.
    ///
    /// Default: current directory
    pub fn workspace<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.workspace = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the bundle directory name.
    ///
    /// Default: `langchain`
    pub fn bundle_name(mut self, name: impl Into<String>) -> Self {
        self.bundle_name = Some(name.into());
        self
    }

    /// Sets the stage location.
    ///
    /// Default: `@langchain_stage`
    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Sets the connection profile name.
    ///
    /// Default: `default`
    pub fn connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    /// Sets the install spec for the current project.
    ///
    /// Default: `.`
    pub fn project_spec(mut self, spec: impl Into<String>) -> Self {
        self.project_spec = Some(spec.into());
        self
    }

    /// Sets the current project's distribution name.
    ///
    /// Default: none (detected from project metadata by the CLI)
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Sets the pinned package list.
    ///
    /// Default: the five curated LangChain pins
    pub fn packages(mut self, packages: Vec<PinnedPackage>) -> Self {
        self.packages = Some(packages);
        self
    }

    /// Sets the glob patterns removed by Clean.
    ///
    /// Default: `build`, `dist`, `*.egg-info`
    pub fn clean_patterns(mut self, patterns: Vec<String>) -> Self {
        self.clean_patterns = Some(patterns);
        self
    }

    /// Sets the installer command.
    ///
    /// Default: `pip`
    pub fn pip(mut self, command: ToolCommand) -> Self {
        self.pip = Some(command);
        self
    }

    /// Sets the Snowflake CLI command.
    ///
    /// Default: `snow`
    pub fn snow(mut self, command: ToolCommand) -> Self {
        self.snow = Some(command);
        self
    }

    /// Sets the per-tool timeout.
    ///
    /// Default: 30 minutes
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] if:
    /// - the bundle name is empty, `.`/`..`, or contains a path separator
    /// - the stage or connection is empty
    /// - two pins name the same distribution
    /// - a clean pattern could reach outside the workspace
    pub fn build(self) -> Result<Settings> {
        let workspace = self.workspace.unwrap_or_else(|| PathBuf::from("."));
        let workspace = workspace
            .absolutize()
            .fs_context("resolving workspace", &workspace)?
            .into_owned();

        let bundle_name = self
            .bundle_name
            .unwrap_or_else(|| DEFAULT_BUNDLE_NAME.to_string());
        validate_bundle_name(&bundle_name)?;

        let defaults = StageSettings::default();
        let stage = StageSettings {
            name: self.stage.unwrap_or(defaults.name),
            connection: self.connection.unwrap_or(defaults.connection),
        };
        if stage.name.trim().is_empty() {
            return Err(Error::InvalidSettings("stage name cannot be empty".into()));
        }
        if stage.connection.trim().is_empty() {
            return Err(Error::InvalidSettings(
                "connection profile cannot be empty".into(),
            ));
        }

        let project_spec = self.project_spec.unwrap_or_else(|| ".".to_string());
        if project_spec.trim().is_empty() {
            return Err(Error::InvalidSettings("project spec cannot be empty".into()));
        }

        let packages = self.packages.unwrap_or_else(default_pins);
        let mut seen = HashSet::new();
        for pin in &packages {
            if !seen.insert(pin.normalized_name()) {
                return Err(Error::InvalidSettings(format!(
                    "package `{}` is pinned more than once",
                    pin.name()
                )));
            }
        }

        let clean_patterns = self.clean_patterns.unwrap_or_else(|| {
            DEFAULT_CLEAN_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect()
        });
        for pattern in &clean_patterns {
            let path = Path::new(pattern);
            if pattern.trim().is_empty()
                || path.is_absolute()
                || path
                    .components()
                    .any(|c| matches!(c, std::path::Component::ParentDir))
            {
                return Err(Error::InvalidSettings(format!(
                    "clean pattern `{pattern}` must be a relative path inside the workspace"
                )));
            }
        }

        let defaults = ToolSettings::default();
        let tools = ToolSettings {
            pip: self.pip.unwrap_or(defaults.pip),
            snow: self.snow.unwrap_or(defaults.snow),
            timeout: self.tool_timeout.unwrap_or(defaults.timeout),
        };

        Ok(Settings::new(
            workspace,
            bundle_name,
            stage,
            project_spec,
            self.project_name,
            packages,
            clean_patterns,
            tools,
        ))
    }
}

fn validate_bundle_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidSettings("bundle name cannot be empty".into()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::InvalidSettings(format!(
            "bundle name `{name}` must be a plain directory name"
        )));
    }
    Ok(())
}
