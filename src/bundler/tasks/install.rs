//! Install: the current project plus the pinned packages into the bundle
//! directory, source-only and without dependency resolution.

use crate::bundler::{
    Settings,
    error::{Error, Result},
    inspect::{self, InstalledDistribution},
    settings::{PinnedPackage, ToolCommand},
    utils::{
        fs::{create_dir_all, dir_has_entries},
        process::run_tool,
    },
};
use std::{future::Future, path::Path, time::Duration};

/// Everything an installer needs for one run.
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    /// Directory the installer runs in.
    pub workspace: &'a Path,
    /// Flat install target.
    pub target_dir: &'a Path,
    /// Install spec for the current project.
    pub project: &'a str,
    /// Exact pins.
    pub packages: &'a [PinnedPackage],
}

/// Installs packages into a target directory.
///
/// Implementations must install only the named packages (no dependency
/// resolution) and refuse binary-only distributions.
pub trait PackageInstaller {
    /// Runs the installation.
    fn install(&self, request: &InstallRequest<'_>) -> impl Future<Output = Result<()>>;
}

/// Installs with `pip install --no-deps --no-binary :all: --target`.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    command: ToolCommand,
    timeout: Duration,
}

impl PipInstaller {
    /// Creates an installer running `command`.
    pub fn new(command: ToolCommand, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    /// Creates an installer from the configured tool settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.tools().pip.clone(), settings.tools().timeout)
    }

    /// Arguments passed after the configured pip command.
    pub fn install_args(request: &InstallRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "install".to_string(),
            "--disable-pip-version-check".to_string(),
            "--no-input".to_string(),
            "--no-deps".to_string(),
            "--no-binary".to_string(),
            ":all:".to_string(),
            "--target".to_string(),
            request.target_dir.display().to_string(),
            request.project.to_string(),
        ];
        args.extend(request.packages.iter().map(PinnedPackage::to_string));
        args
    }
}

impl PackageInstaller for PipInstaller {
    async fn install(&self, request: &InstallRequest<'_>) -> Result<()> {
        let args = Self::install_args(request);
        run_tool(&self.command, &args, request.workspace, self.timeout).await
    }
}

/// Runs Install for `settings` with `installer`.
///
/// Refuses to install over a non-empty bundle directory, then checks the
/// result holds exactly the pins plus the project.
///
/// # Errors
///
/// - [`Error::StaleBundle`] if the bundle directory already has content
/// - whatever the installer reports (a pin with no source distribution, an
///   unknown version, network failure)
/// - [`Error::UnexpectedContents`] if the installed set is not closed
pub async fn install<I: PackageInstaller>(
    settings: &Settings,
    installer: &I,
) -> Result<Vec<InstalledDistribution>> {
    let bundle_dir = settings.bundle_dir();

    if dir_has_entries(&bundle_dir).await? {
        return Err(Error::StaleBundle(bundle_dir));
    }
    create_dir_all(&bundle_dir).await?;

    log::info!(
        "Installing {} + {} pinned package(s) into {}",
        settings.project_spec(),
        settings.packages().len(),
        bundle_dir.display()
    );

    let request = InstallRequest {
        workspace: settings.workspace(),
        target_dir: &bundle_dir,
        project: settings.project_spec(),
        packages: settings.packages(),
    };
    installer.install(&request).await?;

    let verify_settings = settings.clone();
    let verify_dir = bundle_dir.clone();
    let installed = tokio::task::spawn_blocking(move || {
        inspect::verify_bundle(&verify_settings, &verify_dir)
    })
    .await
    .map_err(|e| Error::GenericError(format!("Bundle verification task panicked: {}", e)))??;

    for distribution in &installed {
        log::debug!("  installed {} {}", distribution.name, distribution.version);
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::SettingsBuilder;

    #[test]
    fn pip_args_are_source_only_and_dependency_free() {
        let pins: Vec<PinnedPackage> = vec!["langchain==0.3.1".parse().unwrap()];
        let request = InstallRequest {
            workspace: Path::new("/work"),
            target_dir: Path::new("/work/langchain"),
            project: ".",
            packages: &pins,
        };
        let args = PipInstaller::install_args(&request);

        assert_eq!(args[0], "install");
        assert!(args.contains(&"--no-deps".to_string()));
        let no_binary = args.iter().position(|a| a == "--no-binary").unwrap();
        assert_eq!(args[no_binary + 1], ":all:");
        let target = args.iter().position(|a| a == "--target").unwrap();
        assert_eq!(args[target + 1], "/work/langchain");
        assert_eq!(&args[args.len() - 2..], [".", "langchain==0.3.1"]);
    }

    struct NeverCalled;

    impl PackageInstaller for NeverCalled {
        async fn install(&self, _request: &InstallRequest<'_>) -> Result<()> {
            panic!("installer must not run over a stale bundle");
        }
    }

    #[tokio::test]
    async fn stale_bundle_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new().workspace(dir.path()).build().unwrap();
        std::fs::create_dir_all(settings.bundle_dir().join("leftover")).unwrap();

        let err = install(&settings, &NeverCalled).await.unwrap_err();
        assert!(matches!(err, Error::StaleBundle(_)));
    }
}
