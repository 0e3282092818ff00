//! Aggregation of high-volume diagnostics
//!
//! Some validator codes fire once per accessor element, burying everything
//! else. For those codes, repeated messages at the same pointer collapse into
//! one synthetic message carrying the occurrence count.

use glance_core::{Message, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One aggregated code and its summary template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationRule {
    pub code: String,
    /// Summary text; `{count}` is replaced by the occurrence count
    pub template: String,
}

impl AggregationRule {
    pub fn new(code: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            template: template.into(),
        }
    }

    pub fn render(&self, count: usize) -> String {
        self.template.replace("{count}", &count.to_string())
    }
}

/// Ordered set of aggregated codes
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationPolicy {
    rules: Vec<AggregationRule>,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self::new(vec![
            AggregationRule::new(
                "ACCESSOR_NON_UNIT",
                "{count} accessor elements not of unit length: 0. [AGGREGATED]",
            ),
            AggregationRule::new(
                "ACCESSOR_ANIMATION_INPUT_NON_INCREASING",
                "{count} animation input accessor elements not in ascending order. [AGGREGATED]",
            ),
        ])
    }
}

impl AggregationPolicy {
    /// Build a policy; later rules repeating an earlier code are ignored
    pub fn new(rules: Vec<AggregationRule>) -> Self {
        let mut unique: Vec<AggregationRule> = Vec::with_capacity(rules.len());
        for rule in rules {
            if unique.iter().any(|r| r.code == rule.code) {
                log::warn!("Duplicate aggregation rule for '{}' ignored", rule.code);
                continue;
            }
            unique.push(rule);
        }
        Self { rules: unique }
    }

    /// A policy that aggregates nothing
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[AggregationRule] {
        &self.rules
    }

    pub fn rule_for(&self, code: &str) -> Option<&AggregationRule> {
        self.rules.iter().find(|r| r.code == code)
    }

    /// Collapse repeated `(code, pointer)` pairs of aggregated codes
    ///
    /// Pairs seen at least twice are removed and replaced by one synthetic
    /// error appended after the remaining messages, ordered by rule then by
    /// first appearance of the pointer. Single occurrences are kept as-is.
    pub fn aggregate(&self, messages: Vec<Message>) -> Vec<Message> {
        let mut counts: HashMap<(String, String), usize> = HashMap::new();
        let mut first_seen: Vec<(String, String)> = Vec::new();

        for message in &messages {
            if self.rule_for(&message.code).is_none() {
                continue;
            }
            let key = (message.code.clone(), message.pointer.clone());
            let count = counts.entry(key.clone()).or_insert(0);
            if *count == 0 {
                first_seen.push(key);
            }
            *count += 1;
        }

        let is_collapsed = |message: &Message| {
            counts
                .get(&(message.code.clone(), message.pointer.clone()))
                .map(|&count| count >= 2)
                .unwrap_or(false)
        };

        let mut result: Vec<Message> = messages
            .iter()
            .filter(|m| !is_collapsed(*m))
            .cloned()
            .collect();

        for rule in &self.rules {
            for (code, pointer) in first_seen.iter().filter(|(code, _)| *code == rule.code) {
                let count = counts[&(code.clone(), pointer.clone())];
                if count >= 2 {
                    result.push(Message::new(
                        code.clone(),
                        pointer.clone(),
                        Severity::Error,
                        rule.render(count),
                    ));
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_unit(pointer: &str) -> Message {
        Message::new(
            "ACCESSOR_NON_UNIT",
            pointer,
            Severity::Error,
            "Accessor element at index 0 is not of unit length: 0.",
        )
    }

    fn non_increasing(pointer: &str) -> Message {
        Message::new(
            "ACCESSOR_ANIMATION_INPUT_NON_INCREASING",
            pointer,
            Severity::Error,
            "Animation input accessor element at index 1 is less than or equal to previous.",
        )
    }

    #[test]
    fn test_single_occurrence_untouched() {
        let policy = AggregationPolicy::default();
        let input = vec![non_unit("/meshes/0")];
        assert_eq!(policy.aggregate(input.clone()), input);
    }

    #[test]
    fn test_two_occurrences_collapse() {
        let policy = AggregationPolicy::default();
        let result = policy.aggregate(vec![non_unit("/meshes/0"), non_unit("/meshes/0")]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code, "ACCESSOR_NON_UNIT");
        assert_eq!(result[0].pointer, "/meshes/0");
        assert!(result[0].message.contains('2'));
        assert_eq!(result[0].message, "2 accessor elements not of unit length: 0. [AGGREGATED]");
    }

    #[test]
    fn test_counts_are_per_pointer() {
        let policy = AggregationPolicy::default();
        let result = policy.aggregate(vec![
            non_unit("/accessors/1"),
            non_unit("/accessors/2"),
            non_unit("/accessors/1"),
            non_unit("/accessors/1"),
        ]);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].pointer, "/accessors/2");
        assert_eq!(result[1].pointer, "/accessors/1");
        assert!(result[1].message.starts_with("3 "));
    }

    #[test]
    fn test_unrelated_codes_pass_through_in_order() {
        let policy = AggregationPolicy::default();
        let other = Message::new("UNRESOLVED_REFERENCE", "/nodes/0/mesh", Severity::Error, "x");
        let result = policy.aggregate(vec![
            non_increasing("/accessors/4"),
            other.clone(),
            non_unit("/accessors/3"),
            non_increasing("/accessors/4"),
            other.clone(),
        ]);

        assert_eq!(result[0], other);
        assert_eq!(result[1].code, "ACCESSOR_NON_UNIT");
        assert_eq!(result[2], other);
        assert_eq!(result[3].code, "ACCESSOR_ANIMATION_INPUT_NON_INCREASING");
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_synthetic_messages_follow_rule_order() {
        let policy = AggregationPolicy::default();
        let result = policy.aggregate(vec![
            non_increasing("/accessors/9"),
            non_increasing("/accessors/9"),
            non_unit("/accessors/1"),
            non_unit("/accessors/1"),
        ]);
        assert_eq!(result[0].code, "ACCESSOR_NON_UNIT");
        assert_eq!(result[1].code, "ACCESSOR_ANIMATION_INPUT_NON_INCREASING");
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let policy = AggregationPolicy::default();
        let input = vec![
            non_unit("/accessors/1"),
            non_unit("/accessors/1"),
            non_unit("/accessors/2"),
            non_increasing("/accessors/3"),
            non_increasing("/accessors/3"),
            non_increasing("/accessors/3"),
        ];
        let once = policy.aggregate(input);
        let twice = policy.aggregate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_policy() {
        let policy = AggregationPolicy::new(vec![
            AggregationRule::new("MESH_PRIMITIVE_UNEQUAL_ACCESSOR_COUNT", "{count} unequal counts"),
            AggregationRule::new("MESH_PRIMITIVE_UNEQUAL_ACCESSOR_COUNT", "ignored"),
        ]);
        assert_eq!(policy.rules().len(), 1);

        let msg = Message::new("MESH_PRIMITIVE_UNEQUAL_ACCESSOR_COUNT", "/meshes/0", Severity::Error, "m");
        let result = policy.aggregate(vec![msg.clone(), msg, non_unit("/a"), non_unit("/a")]);
        assert_eq!(result.len(), 3);
        assert_eq!(result[2].message, "2 unequal counts");
    }

    #[test]
    fn test_empty_policy_keeps_everything() {
        let input = vec![non_unit("/a"), non_unit("/a")];
        assert_eq!(AggregationPolicy::none().aggregate(input.clone()), input);
    }
}
