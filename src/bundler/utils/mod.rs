//! Shared helpers for the packaging tasks.

pub mod fs;
pub mod process;
