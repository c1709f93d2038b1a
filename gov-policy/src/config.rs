//! Policy and rule configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use gov_primitives::Severity;

fn default_version() -> String {
    "1.0".to_owned()
}

fn default_enabled() -> bool {
    true
}

/// Configuration for one rule instance within a policy. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    name: String,
    #[serde(rename = "type")]
    rule_type: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    severity: Severity,
    #[serde(default)]
    params: Map<String, Value>,
}

impl RuleConfig {
    /// Creates an enabled rule of the given catalogue type with default
    /// (medium) severity and empty params.
    #[must_use]
    pub fn new(name: impl Into<String>, rule_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rule_type: rule_type.into(),
            enabled: true,
            severity: Severity::default(),
            params: Map::new(),
        }
    }

    /// Sets the severity applied to this rule's verdicts.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Adds a param forwarded to the rule's evaluator.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Replaces the full params map.
    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Marks the rule as disabled; disabled rules produce no verdict.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Rule label, unique within its policy.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalogue key used to resolve the evaluator.
    #[must_use]
    pub fn rule_type(&self) -> &str {
        &self.rule_type
    }

    /// Whether the rule participates in evaluation.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Severity applied to this rule's verdicts.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Params forwarded to the evaluator.
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

/// A named, ordered list of rules. Immutable; identified by name for lookup.
///
/// Rule order is both evaluation order and tie-break order for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    name: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    rules: Vec<RuleConfig>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl Policy {
    /// Creates an empty policy with version `1.0`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            description: String::new(),
            rules: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the free-form version string.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a rule; rules evaluate in insertion order.
    #[must_use]
    pub fn with_rule(mut self, rule: RuleConfig) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds a metadata entry (author, team, ticket, ...).
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Policy name, used for registry lookup.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form version string; not semver-validated.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Free-text description of what the policy governs.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[RuleConfig] {
        &self.rules
    }

    /// The rules that participate in evaluation.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &RuleConfig> {
        self.rules.iter().filter(|rule| rule.enabled())
    }

    /// String metadata attached to the policy.
    #[must_use]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
