//! Bundle inspection.
//!
//! After Install the bundle directory must hold exactly the pinned packages
//! plus the current project, built from source. Installers leave one metadata
//! record per distribution at the top level (`name-version.dist-info`, or
//! `name-version-pyX.Y.egg-info` for legacy installs); those records are what
//! gets checked.

use crate::bundler::{
    Settings,
    error::{Error, ErrorExt, Result},
    settings::normalize_name,
};
use serde::Serialize;
use std::{collections::HashMap, path::Path};

/// A distribution found in the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledDistribution {
    /// Name as recorded (underscored, not normalized).
    pub name: String,
    /// Version as recorded; empty if the record carries none.
    pub version: String,
}

impl InstalledDistribution {
    /// PEP 503 normalized name.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Lists distributions installed at the top level of `bundle_dir`.
///
/// Sorted by normalized name.
pub fn installed_distributions(bundle_dir: &Path) -> Result<Vec<InstalledDistribution>> {
    let entries = std::fs::read_dir(bundle_dir).fs_context("reading bundle directory", bundle_dir)?;

    let mut distributions = Vec::new();
    for entry in entries {
        let entry = entry.fs_context("reading bundle directory", bundle_dir)?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(distribution) = parse_record_name(file_name) {
            distributions.push(distribution);
        }
    }

    distributions.sort_by_key(InstalledDistribution::normalized_name);
    Ok(distributions)
}

fn parse_record_name(file_name: &str) -> Option<InstalledDistribution> {
    let stem = file_name
        .strip_suffix(".dist-info")
        .or_else(|| file_name.strip_suffix(".egg-info"))?;
    let mut parts = stem.split('-');
    let name = parts.next().filter(|n| !n.is_empty())?;
    let version = parts.next().unwrap_or_default();
    Some(InstalledDistribution {
        name: name.to_string(),
        version: version.to_string(),
    })
}

/// Checks the bundle holds exactly the pins plus the project.
///
/// Extension modules are allowed: with binary distributions refused, any
/// `.so` or `.pyd` in the bundle was compiled here from an sdist.
///
/// When the project's name is unknown, at most one unrecognized distribution
/// is tolerated and assumed to be the project.
///
/// # Errors
///
/// [`Error::UnexpectedContents`] listing every problem found.
pub fn verify_bundle(settings: &Settings, bundle_dir: &Path) -> Result<Vec<InstalledDistribution>> {
    let installed = installed_distributions(bundle_dir)?;
    let mut problems = Vec::new();

    let pins: HashMap<String, &str> = settings
        .packages()
        .iter()
        .map(|pin| (pin.normalized_name(), pin.version()))
        .collect();
    let project = settings.project_name().map(normalize_name);

    let mut seen_pins = Vec::new();
    let mut seen_project = false;
    let mut unrecognized = Vec::new();

    for distribution in &installed {
        let name = distribution.normalized_name();
        if let Some(pinned) = pins.get(&name) {
            seen_pins.push(name.clone());
            if distribution.version != *pinned {
                problems.push(format!(
                    "{} is installed as {} but pinned to {}",
                    distribution.name, distribution.version, pinned
                ));
            }
        } else if project.as_deref() == Some(name.as_str()) {
            seen_project = true;
        } else {
            unrecognized.push(distribution);
        }
    }

    match &project {
        Some(project) => {
            if !seen_project {
                problems.push(format!("project {project} is not installed"));
            }
            for distribution in &unrecognized {
                problems.push(format!(
                    "unexpected distribution {} {}",
                    distribution.name, distribution.version
                ));
            }
        }
        None => {
            log::warn!(
                "Project name unknown; cannot tell the project apart from extra distributions"
            );
            if unrecognized.len() > 1 {
                let names: Vec<_> = unrecognized
                    .iter()
                    .map(|d| format!("{} {}", d.name, d.version))
                    .collect();
                problems.push(format!(
                    "more than one distribution outside the pins: {}",
                    names.join(", ")
                ));
            }
        }
    }

    for pin in settings.packages() {
        if !seen_pins.contains(&pin.normalized_name()) {
            problems.push(format!("pinned package {pin} is not installed"));
        }
    }

    if problems.is_empty() {
        Ok(installed)
    } else {
        Err(Error::UnexpectedContents(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::SettingsBuilder;

    fn populate(bundle: &Path, records: &[&str]) {
        for record in records {
            std::fs::create_dir_all(bundle.join(record)).unwrap();
        }
    }

    fn settings(dir: &Path, project: Option<&str>) -> Settings {
        let mut builder = SettingsBuilder::new().workspace(dir).packages(vec![
            "langchain-core==0.3.7".parse().unwrap(),
            "langsmith==0.1.129".parse().unwrap(),
        ]);
        if let Some(project) = project {
            builder = builder.project_name(project);
        }
        builder.build().unwrap()
    }

    #[test]
    fn parses_dist_info_and_egg_info_records() {
        assert_eq!(
            parse_record_name("langchain_core-0.3.7.dist-info"),
            Some(InstalledDistribution {
                name: "langchain_core".into(),
                version: "0.3.7".into()
            })
        );
        assert_eq!(
            parse_record_name("langchain_snowpoc-0.1.0-py3.11.egg-info")
                .unwrap()
                .version,
            "0.1.0"
        );
        assert_eq!(parse_record_name("langchain_core"), None);
    }

    #[test]
    fn exact_set_passes() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("langchain");
        populate(
            &bundle,
            &[
                "langchain_core",
                "langchain_core-0.3.7.dist-info",
                "langsmith-0.1.129.dist-info",
                "langchain_snowpoc-0.1.0.dist-info",
            ],
        );
        let installed = verify_bundle(&settings(dir.path(), Some("langchain-snowpoc")), &bundle)
            .unwrap();
        assert_eq!(installed.len(), 3);
    }

    #[test]
    fn transitive_extras_and_wrong_versions_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("langchain");
        populate(
            &bundle,
            &[
                "langchain_core-0.3.6.dist-info",
                "pydantic-2.9.2.dist-info",
                "langchain_snowpoc-0.1.0.dist-info",
            ],
        );

        let err = verify_bundle(&settings(dir.path(), Some("langchain_snowpoc")), &bundle)
            .unwrap_err();
        let Error::UnexpectedContents(problems) = err else {
            panic!("unexpected error kind");
        };
        let text = problems.join("\n");
        assert!(text.contains("pinned to 0.3.7"));
        assert!(text.contains("unexpected distribution pydantic"));
        assert!(text.contains("langsmith==0.1.129 is not installed"));
    }

    #[test]
    fn extension_modules_built_from_source_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("langchain");
        populate(
            &bundle,
            &[
                "simplejson",
                "simplejson-3.19.3.dist-info",
                "langchain_snowpoc-0.1.0.dist-info",
            ],
        );
        std::fs::write(
            bundle.join("simplejson/_speedups.cpython-311-x86_64-linux-gnu.so"),
            b"\x7fELF",
        )
        .unwrap();
        let settings = SettingsBuilder::new()
            .workspace(dir.path())
            .packages(vec!["simplejson==3.19.3".parse().unwrap()])
            .project_name("langchain-snowpoc")
            .build()
            .unwrap();

        let installed = verify_bundle(&settings, &bundle).unwrap();
        assert_eq!(installed.len(), 2);
    }

    #[test]
    fn unknown_project_tolerates_one_extra() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("langchain");
        populate(
            &bundle,
            &[
                "langchain_core-0.3.7.dist-info",
                "langsmith-0.1.129.dist-info",
                "langchain_snowpoc-0.1.0.dist-info",
            ],
        );
        assert!(verify_bundle(&settings(dir.path(), None), &bundle).is_ok());

        populate(&bundle, &["requests-2.32.3.dist-info"]);
        assert!(verify_bundle(&settings(dir.path(), None), &bundle).is_err());
    }
}
