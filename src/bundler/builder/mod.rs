//! Pipeline orchestration and coordination.
//!
//! This module provides the main [`Pipeline`] orchestrator that runs the
//! packaging tasks in dependency order.
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for archives
//! - [`orchestrator`] - Main [`Pipeline`] struct and run reports
//! - [`tool_detection`] - External tool lookup

pub mod checksum;
mod orchestrator;
pub mod tool_detection;

pub use orchestrator::{Pipeline, RunReport, TaskEvent};
