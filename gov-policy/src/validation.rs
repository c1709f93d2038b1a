//! Structural policy validation results.

use serde::{Deserialize, Serialize};

/// Result of validating a policy against the rule catalogue.
///
/// Validation collects *all* problems in one pass so a policy author sees
/// the full error set at once, and is idempotent over an unmodified policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyValidation {
    valid: bool,
    errors: Vec<String>,
    enabled_rule_count: usize,
}

impl PolicyValidation {
    /// Builds a validation result; `valid` is derived from the error list.
    #[must_use]
    pub fn new(errors: Vec<String>, enabled_rule_count: usize) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            enabled_rule_count,
        }
    }

    /// True when no problems were found.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Every problem found, in rule order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Number of rules that would participate in evaluation.
    #[must_use]
    pub fn enabled_rule_count(&self) -> usize {
        self.enabled_rule_count
    }
}
