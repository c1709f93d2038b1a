//! Per-rule evaluation outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use gov_primitives::Severity;

/// The outcome of one rule evaluated against one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleVerdict {
    rule_name: String,
    passed: bool,
    severity: Severity,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Map<String, Value>,
}

impl RuleVerdict {
    /// Creates a verdict from the engine's view of an evaluator outcome.
    #[must_use]
    pub fn new(
        rule_name: impl Into<String>,
        passed: bool,
        severity: Severity,
        message: impl Into<String>,
        details: Map<String, Value>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            passed,
            severity,
            message: message.into(),
            details,
        }
    }

    /// Creates a failing verdict.
    #[must_use]
    pub fn fail(
        rule_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        details: Map<String, Value>,
    ) -> Self {
        Self::new(rule_name, false, severity, message, details)
    }

    /// Name of the rule that produced this verdict.
    #[must_use]
    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    /// Whether the action satisfied the rule.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Severity carried by the verdict (from the rule's configuration).
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Explanation of the verdict; empty when it passed.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured context (matched spans, offending values, diagnostics).
    #[must_use]
    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}
