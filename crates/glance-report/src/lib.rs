//! Glance Report - Normalization and presentation of validation reports
//!
//! This crate turns raw validator output into a `NormalizedReport`
//! (severity buckets, generator attribution, aggregated noisy codes) and
//! presents it as a compact toggle plus an on-demand full report.

mod aggregate;
mod normalize;
mod outcome;
mod presenter;
mod registry;
mod surface;
mod templates;

pub use aggregate::{AggregationPolicy, AggregationRule};
pub use normalize::{max_severity, partition, NormalizedReport, Normalizer};
pub use outcome::{CapturedException, ExceptionKind, ValidationOutcome};
pub use presenter::{Presenter, ToggleAction, ToggleContext, ToggleState};
pub use registry::{GeneratorEntry, GeneratorMatch, GeneratorRegistry};
pub use surface::{FileSurface, MemorySurface, ReportSurface};
pub use templates::{HtmlTemplates, ReportTemplates, TextTemplates};
