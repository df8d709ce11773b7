//! Configuration structures for the packaging pipeline.
//!
//! [`Settings`] is the single structured settings object every task reads.
//! It is assembled by [`SettingsBuilder`], optionally seeded from a
//! [`SettingsFile`].

mod builder;
mod core;
mod file;
mod package;
mod stage;
mod tools;

// Re-export all public types
pub use builder::SettingsBuilder;
pub use self::core::{DEFAULT_BUNDLE_NAME, Settings};
pub use file::{SETTINGS_FILE_NAME, SettingsFile};
pub use package::{PinnedPackage, default_pins, normalize_name};
pub use stage::StageSettings;
pub use tools::{DEFAULT_TOOL_TIMEOUT, ToolCommand, ToolSettings};
