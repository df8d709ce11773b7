//! Project metadata discovery from `pyproject.toml` or `setup.py`.

use crate::error::{BundlerError, CliError, Result};
use regex::Regex;
use std::{path::Path, sync::LazyLock};

static SETUP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bname\s*=\s*["']([^"']+)["']"#)
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

static SETUP_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bversion\s*=\s*["']([^"']+)["']"#)
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Identity of the Python project being bundled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// Distribution name
    pub name: String,

    /// Version, when declared as a literal
    pub version: Option<String>,

    /// File the metadata came from
    pub source: &'static str,
}

/// Detects the project in `workspace`.
///
/// `pyproject.toml` (`[project]` table) wins over `setup.py`. Returns `None`
/// if neither file declares a literal name.
pub fn detect_project(workspace: &Path) -> Result<Option<ProjectMetadata>> {
    let pyproject = workspace.join("pyproject.toml");
    if pyproject.is_file() {
        let text = read(&pyproject)?;
        let value: toml::Value = toml::from_str(&text).map_err(|e| {
            BundlerError::Cli(CliError::ExecutionFailed {
                command: "parse_pyproject".to_string(),
                reason: format!("Failed to parse {}: {}", pyproject.display(), e),
            })
        })?;
        let project = value.get("project");
        if let Some(name) = project.and_then(|p| p.get("name")).and_then(|v| v.as_str()) {
            return Ok(Some(ProjectMetadata {
                name: name.to_string(),
                version: project
                    .and_then(|p| p.get("version"))
                    .and_then(|v| v.as_str())
                    .map(String::from),
                source: "pyproject.toml",
            }));
        }
    }

    let setup_py = workspace.join("setup.py");
    if setup_py.is_file() {
        let text = read(&setup_py)?;
        if let Some(name) = SETUP_NAME.captures(&text).map(|c| c[1].to_string()) {
            return Ok(Some(ProjectMetadata {
                name,
                version: SETUP_VERSION.captures(&text).map(|c| c[1].to_string()),
                source: "setup.py",
            }));
        }
    }

    Ok(None)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_project_metadata".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_setup_py_literals() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("setup.py"),
            r#"from setuptools import setup, find_packages

setup(
    name="langchain-snowpoc",
    version="0.1.0",
    packages=find_packages(),
    author_email="someone@example.com",
)
"#,
        )
        .unwrap();

        let metadata = detect_project(dir.path()).unwrap().unwrap();
        assert_eq!(metadata.name, "langchain-snowpoc");
        assert_eq!(metadata.version.as_deref(), Some("0.1.0"));
        assert_eq!(metadata.source, "setup.py");
    }

    #[test]
    fn pyproject_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("setup.py"), "setup(name='old-name')\n").unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"langchain-snowpoc\"\nversion = \"0.2.0\"\n",
        )
        .unwrap();

        let metadata = detect_project(dir.path()).unwrap().unwrap();
        assert_eq!(metadata.name, "langchain-snowpoc");
        assert_eq!(metadata.source, "pyproject.toml");
    }

    #[test]
    fn pyproject_without_project_table_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pyproject.toml"), "[build-system]\nrequires = []\n")
            .unwrap();
        std::fs::write(dir.path().join("setup.py"), "setup(name=\"pkg\")\n").unwrap();

        assert_eq!(detect_project(dir.path()).unwrap().unwrap().name, "pkg");
    }

    #[test]
    fn nothing_declared_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(detect_project(dir.path()).unwrap().is_none());
    }
}
