//! Packaging pipeline for a Snowflake notebook proof of concept.
//!
//! Installs a Python project plus a pinned set of LangChain packages into a
//! bundle directory, zips it, and copies the archive to a Snowflake stage.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
