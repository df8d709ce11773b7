//! Command line interface for the snowpoc bundler.
//!
//! This module parses arguments, resolves settings, runs the requested task
//! chain and renders progress and the final report.

mod args;
mod output;

pub use args::{Args, RuntimeConfig, TaskArg};
pub use output::OutputManager;

use crate::{
    bundler::{
        PipInstaller, Pipeline, RunReport, Settings, SettingsBuilder, SettingsFile,
        SnowCliUploader, Task, TaskEvent, TaskStatus, settings::SETTINGS_FILE_NAME,
    },
    error::{BundlerError, CliError, Result},
    metadata,
};
use anyhow::Context as _;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    run_with_args(args).await
}

/// Runs an already-parsed command line.
pub async fn run_with_args(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    let runtime_config = RuntimeConfig::from(&args);

    if args.task == TaskArg::Help {
        print_task_help(&runtime_config)?;
        return Ok(0);
    }

    let settings = load_settings(&args, &runtime_config)?;
    let plan = args.plan();

    let pipeline = Pipeline::new(
        PipInstaller::from_settings(&settings),
        SnowCliUploader::from_settings(&settings),
        settings,
    );

    let settings = pipeline.settings();
    runtime_config.verbose_println(&format!(
        "Workspace: {}\nBundle: {} -> {}\nStage: {} (connection `{}`)",
        settings.workspace().display(),
        settings.bundle_dir().display(),
        settings.archive_name(),
        settings.stage().name,
        settings.stage().connection
    ))?;

    let result = pipeline
        .run_with(&plan, |event| render_event(&runtime_config, event))
        .await;

    match result {
        Ok(report) => {
            print_report(&runtime_config, &report)?;
            Ok(0)
        }
        Err(error) => {
            // The failing task was already reported through its event
            let error = BundlerError::from(error);
            for suggestion in error.recovery_suggestions() {
                runtime_config.indent(&suggestion)?;
            }
            Ok(error.exit_code())
        }
    }
}

/// Builds [`Settings`]: defaults, then the settings file, then flags.
pub fn load_settings(args: &Args, runtime_config: &RuntimeConfig) -> Result<Settings> {
    let mut builder = SettingsBuilder::new().workspace(&args.workspace);

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let candidate = args.workspace.join(SETTINGS_FILE_NAME);
            candidate.is_file().then_some(candidate)
        }
    };

    let mut project_name_configured = false;
    if let Some(path) = config_path {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let file = SettingsFile::parse(&text)?;
        project_name_configured = file.install.project_name.is_some();
        builder = file.apply(builder)?;
        runtime_config.verbose_println(&format!("Loaded settings from {}", path.display()))?;
    }

    if !project_name_configured {
        match metadata::detect_project(&args.workspace)? {
            Some(project) => {
                log::debug!(
                    "Detected project {} {} from {}",
                    project.name,
                    project.version.as_deref().unwrap_or("(dynamic version)"),
                    project.source
                );
                builder = builder.project_name(project.name);
            }
            None if args.plan().contains(&Task::Install) => runtime_config.warn(&format!(
                "No project name found in {}; set install.project_name in {}",
                args.workspace.display(),
                SETTINGS_FILE_NAME
            ))?,
            None => log::debug!("No project metadata found in {}", args.workspace.display()),
        }
    }

    if let Some(name) = &args.bundle_name {
        builder = builder.bundle_name(name);
    }
    if let Some(stage) = &args.stage {
        builder = builder.stage(stage);
    }
    if let Some(connection) = &args.connection {
        builder = builder.connection(connection);
    }

    Ok(builder.build()?)
}

fn print_task_help(runtime_config: &RuntimeConfig) -> Result<()> {
    let output = runtime_config.output();
    output.println("Tasks:")?;
    output.println(&format!("  {:<10} {}", "all", "Run cleanall, langchain, zip and put"))?;
    output.println(&format!("  {:<10} {}", "help", "Show this list"))?;
    for task in Task::ALL {
        output.println(&format!("  {:<10} {}", task.name(), task.description()))?;
    }
    Ok(())
}

fn render_event(runtime_config: &RuntimeConfig, event: TaskEvent<'_>) {
    // Terminal write failures must not abort the pipeline
    let _ = match event {
        TaskEvent::Started(task) => {
            runtime_config.progress(&format!("{}: {}", task, task.description()))
        }
        TaskEvent::Finished(outcome) => {
            let line = format!("{}: {}", outcome.task, outcome.detail);
            match outcome.status {
                TaskStatus::Done => runtime_config.success(&line),
                TaskStatus::NoOp => runtime_config.indent(&line),
            }
        }
        TaskEvent::Failed(task, error) => runtime_config.error(&format!("{}: {}", task, error)),
    };
}

fn print_report(runtime_config: &RuntimeConfig, report: &RunReport) -> Result<()> {
    if runtime_config.json() {
        let json = serde_json::to_string_pretty(report)?;
        runtime_config.output().println(&json)?;
        return Ok(());
    }

    let elapsed = report.finished_at - report.started_at;
    runtime_config.section(&format!(
        "Completed {} task(s) in {:.1}s",
        report.tasks.len(),
        elapsed.num_milliseconds() as f64 / 1000.0
    ))?;
    if let Some(archive) = report.archive() {
        runtime_config.indent(&format!("archive: {}", archive.path.display()))?;
        runtime_config.indent(&format!("sha256:  {}", archive.sha256))?;
    }
    Ok(())
}
