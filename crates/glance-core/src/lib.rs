//! Glance Core - Foundational types for the Glance validation pipeline
//!
//! This crate provides the types that all other Glance crates depend on:
//! - `Severity` - Diagnostic severity levels in fixed order
//! - `Message`, `Issues`, `ReportInfo`, `RawReport` - Validator output
//! - Error types and Result alias

mod error;
mod types;

pub use error::{GlanceError, Result};
pub use types::{Issues, Message, RawReport, ReportInfo, Resource, Severity};
