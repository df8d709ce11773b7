//! Core Settings struct and implementations.

use super::{PinnedPackage, StageSettings, ToolSettings};
use std::path::{Path, PathBuf};

/// Default bundle directory name. The archive is `<name>.zip`.
pub const DEFAULT_BUNDLE_NAME: &str = "langchain";

/// Default clean targets, relative to the workspace.
pub const DEFAULT_CLEAN_PATTERNS: &[&str] = &["build", "dist", "*.egg-info"];

/// Main settings for the packaging pipeline.
///
/// Central configuration for every task, constructed via [`SettingsBuilder`].
/// All paths derive from the workspace root so tests can point the whole
/// pipeline at a temporary directory.
///
/// # Examples
///
/// ```no_run
/// use snowpoc_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> snowpoc_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .workspace("/path/to/project")
///     .bundle_name("langchain")
///     .stage("@langchain_stage")
///     .connection("default")
///     .build()?;
///
/// assert!(settings.archive_path().ends_with("langchain.zip"));
/// # Ok(())
/// # }
/// ```
///
/// [`SettingsBuilder`]: super::SettingsBuilder
#[derive(Clone, Debug)]
pub struct Settings {
    /// Project root. Tasks run here and all outputs land here.
    workspace: PathBuf,

    /// Bundle directory name.
    bundle_name: String,

    /// Remote target for Publish.
    stage: StageSettings,

    /// Install spec for the current project, usually `.`.
    project_spec: String,

    /// Distribution name of the current project, when known.
    ///
    /// Used to check the installed set after Install.
    project_name: Option<String>,

    /// Exact third-party pins.
    packages: Vec<PinnedPackage>,

    /// Glob patterns removed by Clean.
    clean_patterns: Vec<String>,

    /// External tools.
    tools: ToolSettings,
}

impl Settings {
    /// Returns the workspace root.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Returns the bundle directory name.
    pub fn bundle_name(&self) -> &str {
        &self.bundle_name
    }

    /// Returns the bundle directory path.
    pub fn bundle_dir(&self) -> PathBuf {
        self.workspace.join(&self.bundle_name)
    }

    /// Returns the archive file name, `<bundle-name>.zip`.
    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.bundle_name)
    }

    /// Returns the archive path at the workspace root.
    pub fn archive_path(&self) -> PathBuf {
        self.workspace.join(self.archive_name())
    }

    /// Returns the stage target.
    pub fn stage(&self) -> &StageSettings {
        &self.stage
    }

    /// Returns the install spec for the current project.
    pub fn project_spec(&self) -> &str {
        &self.project_spec
    }

    /// Returns the current project's distribution name, if known.
    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    /// Returns the pinned third-party packages.
    pub fn packages(&self) -> &[PinnedPackage] {
        &self.packages
    }

    /// Returns the clean patterns.
    pub fn clean_patterns(&self) -> &[String] {
        &self.clean_patterns
    }

    /// Returns the tool settings.
    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        workspace: PathBuf,
        bundle_name: String,
        stage: StageSettings,
        project_spec: String,
        project_name: Option<String>,
        packages: Vec<PinnedPackage>,
        clean_patterns: Vec<String>,
        tools: ToolSettings,
    ) -> Self {
        Self {
            workspace,
            bundle_name,
            stage,
            project_spec,
            project_name,
            packages,
            clean_patterns,
            tools,
        }
    }
}
