//! Pinned package specifications.

use crate::bundler::error::{Error, Result};
use std::{fmt, str::FromStr, sync::LazyLock};

static SEPARATOR_RUNS: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"[-_.]+").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Canonical PEP 440 version, the form installers record in `.dist-info`.
static CANONICAL_VERSION: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^([1-9][0-9]*!)?(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))*((a|b|rc)(0|[1-9][0-9]*))?(\.post(0|[1-9][0-9]*))?(\.dev(0|[1-9][0-9]*))?(\+[a-z0-9]+(\.[a-z0-9]+)*)?$",
    )
    .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Normalizes a Python distribution name (PEP 503).
///
/// Lowercases and collapses runs of `-`, `_` and `.` into a single `-`, so
/// `Langchain_Core` and `langchain-core` compare equal.
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUNS
        .replace_all(&name.to_ascii_lowercase(), "-")
        .into_owned()
}

/// A third-party package pinned to one exact version.
///
/// Written as `name==version`. Ranges, extras and markers are rejected:
/// pins are curated by hand and installed verbatim.
///
/// # Examples
///
/// ```
/// use snowpoc_bundler::bundler::PinnedPackage;
///
/// let pin: PinnedPackage = "langchain-core==0.3.7".parse().unwrap();
/// assert_eq!(pin.name(), "langchain-core");
/// assert_eq!(pin.version(), "0.3.7");
/// assert_eq!(pin.to_string(), "langchain-core==0.3.7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinnedPackage {
    name: String,
    version: String,
}

impl PinnedPackage {
    /// Creates a pin, validating both halves.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let version = version.into();
        let spec = format!("{name}=={version}");

        let invalid = |reason: &str| Error::InvalidPin {
            spec: spec.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("missing package name"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid("package name may only contain letters, digits, '-', '_' and '.'"));
        }
        if version.is_empty() {
            return Err(invalid("missing version"));
        }
        if version.contains('*') {
            return Err(invalid("wildcard versions are not exact pins"));
        }
        if !CANONICAL_VERSION.is_match(&version) {
            // `1.0.0-rc1` would be recorded as `1.0.0rc1` and never match
            return Err(invalid(
                "version must be in canonical PEP 440 form, e.g. 1.0.0rc1 or 2.1.post1",
            ));
        }

        Ok(Self { name, version })
    }

    /// Distribution name as written in the pin.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// PEP 503 normalized name.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl FromStr for PinnedPackage {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let Some((name, version)) = spec.split_once("==") else {
            return Err(Error::InvalidPin {
                spec: spec.to_string(),
                reason: "expected an exact `name==version` pin".to_string(),
            });
        };
        if version.starts_with('=') {
            return Err(Error::InvalidPin {
                spec: spec.to_string(),
                reason: "arbitrary equality (`===`) is not supported".to_string(),
            });
        }
        Self::new(name.trim(), version.trim())
    }
}

impl fmt::Display for PinnedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

/// The curated pin list shipped with the notebook bundle.
pub fn default_pins() -> Vec<PinnedPackage> {
    [
        ("langchain-community", "0.3.1"),
        ("langchain-core", "0.3.7"),
        ("langchain-text-splitters", "0.3.0"),
        ("langchain", "0.3.1"),
        ("langsmith", "0.1.129"),
    ]
    .into_iter()
    .map(|(name, version)| PinnedPackage {
        name: name.to_string(),
        version: version.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ranges_and_bare_names() {
        for spec in [
            "langchain",
            "langchain>=0.3",
            "langchain~=0.3.1",
            "langchain==0.3.*",
            "langchain===0.3.1",
            "==0.3.1",
            "langchain[extra]==0.3.1",
        ] {
            assert!(
                spec.parse::<PinnedPackage>().is_err(),
                "{spec} should be rejected"
            );
        }
    }

    #[test]
    fn only_canonical_versions_are_accepted() {
        for version in ["0.3.7", "1.0.0rc1", "2.1.post1", "1.0.dev3", "1!2.0", "1.0+local.7"] {
            assert!(
                PinnedPackage::new("pkg", version).is_ok(),
                "{version} should be accepted"
            );
        }
        for version in ["1.0.0-rc1", "1.0.0_rc1", "v1.0", "1.0.0RC1", "1.0-post1", "01.0"] {
            let err = PinnedPackage::new("pkg", version).unwrap_err();
            assert!(err.to_string().contains("canonical"), "{version}: {err}");
        }
    }

    #[test]
    fn parses_with_surrounding_whitespace() {
        let pin: PinnedPackage = " langsmith == 0.1.129 ".parse().unwrap();
        assert_eq!(pin.name(), "langsmith");
        assert_eq!(pin.version(), "0.1.129");
    }

    #[test]
    fn normalizes_separators_and_case() {
        assert_eq!(normalize_name("Langchain_Text..Splitters"), "langchain-text-splitters");
        assert_eq!(normalize_name("langchain_snowpoc"), "langchain-snowpoc");
    }

    #[test]
    fn default_pins_are_five_valid_unique_packages() {
        let pins = default_pins();
        assert_eq!(pins.len(), 5);
        for pin in &pins {
            let reparsed: PinnedPackage = pin.to_string().parse().unwrap();
            assert_eq!(&reparsed, pin);
        }
        let mut names: Vec<_> = pins.iter().map(PinnedPackage::normalized_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
    }
}
