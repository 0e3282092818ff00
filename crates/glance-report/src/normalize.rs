//! Report normalization: severity bucketing, partitioning and generator lookup

use crate::aggregate::AggregationPolicy;
use crate::registry::{GeneratorMatch, GeneratorRegistry};
use glance_core::{Issues, Message, RawReport, Severity};
use serde::{Serialize, Serializer};

/// A raw report enriched for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReport {
    #[serde(flatten)]
    pub raw: RawReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorMatch>,
    /// Most severe level with a non-zero counter; serialized as -1 when clean
    #[serde(serialize_with = "serialize_level")]
    pub max_severity: Option<Severity>,
    /// Error messages after aggregation
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub infos: Vec<Message>,
    pub hints: Vec<Message>,
}

impl NormalizedReport {
    /// `max_severity` as an integer, -1 when there are no issues
    pub fn max_severity_level(&self) -> i32 {
        self.max_severity.map(|s| s.level() as i32).unwrap_or(-1)
    }

    pub fn has_issues(&self) -> bool {
        self.max_severity.is_some()
    }

    /// Messages of one severity
    pub fn bucket(&self, severity: Severity) -> &[Message] {
        match severity {
            Severity::Error => &self.errors,
            Severity::Warning => &self.warnings,
            Severity::Info => &self.infos,
            Severity::Hint => &self.hints,
        }
    }

    /// Reported counter for one severity
    pub fn count(&self, severity: Severity) -> usize {
        self.raw.issues.count(severity)
    }

    /// Counters in bucketing order
    pub fn counts(&self) -> [usize; 4] {
        Severity::ALL.map(|s| self.count(s))
    }

    pub fn generator_name(&self) -> Option<&str> {
        self.generator.as_ref().map(|g| g.display_name.as_str())
    }
}

fn serialize_level<S: Serializer>(
    value: &Option<Severity>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_i32(value.map(|s| s.level() as i32).unwrap_or(-1))
}

/// First severity level in fixed order whose counter is non-zero
pub fn max_severity(issues: &Issues) -> Option<Severity> {
    Severity::ALL
        .into_iter()
        .find(|&severity| issues.count(severity) > 0)
}

/// Split messages into error, warning, info and hint sequences, keeping order
pub fn partition(messages: &[Message]) -> [Vec<Message>; 4] {
    let mut buckets: [Vec<Message>; 4] = Default::default();
    for message in messages {
        buckets[message.severity.level() as usize].push(message.clone());
    }
    buckets
}

/// Turns raw validator output into a `NormalizedReport`
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    registry: &'a GeneratorRegistry,
    policy: &'a AggregationPolicy,
}

impl<'a> Normalizer<'a> {
    pub fn new(registry: &'a GeneratorRegistry, policy: &'a AggregationPolicy) -> Self {
        Self { registry, policy }
    }

    /// Normalize one raw report. Errors are aggregated exactly once here.
    pub fn normalize(&self, raw: RawReport) -> NormalizedReport {
        let generator = self.registry.find(raw.generator());
        if generator.is_none() && !raw.generator().is_empty() {
            log::debug!("No registry entry for generator '{}'", raw.generator());
        }

        let max_severity = max_severity(&raw.issues);
        let [errors, warnings, infos, hints] = partition(&raw.issues.messages);
        let errors = self.policy.aggregate(errors);

        log::info!(
            "Normalized report: {} error(s), {} warning(s), {} info(s), {} hint(s)",
            raw.issues.num_errors,
            raw.issues.num_warnings,
            raw.issues.num_infos,
            raw.issues.num_hints
        );

        NormalizedReport {
            raw,
            generator,
            max_severity,
            errors,
            warnings,
            infos,
            hints,
        }
    }
}
