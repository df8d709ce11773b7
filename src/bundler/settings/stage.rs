//! Remote stage target.

/// Default stage receiving the archive.
pub const DEFAULT_STAGE: &str = "@langchain_stage";

/// Default Snowflake CLI connection profile.
pub const DEFAULT_CONNECTION: &str = "default";

/// Where Publish copies the archive.
///
/// The connection profile is resolved by the Snowflake CLI from its own
/// configuration; only the profile name travels through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSettings {
    /// Stage location, e.g. `@langchain_stage` or `@db.schema.stage/path`.
    pub name: String,

    /// Named connection profile.
    pub connection: String,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_STAGE.to_string(),
            connection: DEFAULT_CONNECTION.to_string(),
        }
    }
}
