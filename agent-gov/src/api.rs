//! Wire request shapes for the external operations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use gov_compliance::{AutomationLevel, DEFAULT_HOURLY_RATE};
use gov_primitives::AgentAction;

/// Request to evaluate one action against one named policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluateRequest {
    /// Identifier of the agent that performed the action.
    pub agent_id: String,
    /// The action payload to evaluate.
    pub action: AgentAction,
    /// Name of the registered policy to evaluate against.
    pub policy_name: String,
}

fn default_rate() -> f64 {
    DEFAULT_HOURLY_RATE
}

/// Request to generate a compliance cost report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostReportRequest {
    /// Framework identifier (e.g. `gdpr`).
    pub framework: String,
    /// Per-requirement automation-level overrides.
    #[serde(default)]
    pub automation_coverage: HashMap<String, AutomationLevel>,
    /// Labour rate in currency units per hour.
    #[serde(default = "default_rate")]
    pub hourly_rate: f64,
}

impl CostReportRequest {
    /// Creates a request with no overrides at the default hourly rate.
    #[must_use]
    pub fn new(framework: impl Into<String>) -> Self {
        Self {
            framework: framework.into(),
            automation_coverage: HashMap::new(),
            hourly_rate: DEFAULT_HOURLY_RATE,
        }
    }

    /// Overrides the automation level for one requirement.
    #[must_use]
    pub fn with_coverage(mut self, requirement_id: impl Into<String>, level: AutomationLevel) -> Self {
        self.automation_coverage.insert(requirement_id.into(), level);
        self
    }

    /// Sets the hourly rate.
    #[must_use]
    pub fn with_hourly_rate(mut self, hourly_rate: f64) -> Self {
        self.hourly_rate = hourly_rate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluate_request_parses_wire_shape() {
        let request: EvaluateRequest = serde_json::from_value(json!({
            "agent_id": "agent-1",
            "action": {"type": "search", "query": "x"},
            "policy_name": "standard",
        }))
        .unwrap();
        assert_eq!(request.agent_id, "agent-1");
        assert_eq!(request.action.action_type(), "search");
    }

    #[test]
    fn evaluate_request_rejects_unknown_fields() {
        let result = serde_json::from_value::<EvaluateRequest>(json!({
            "agent_id": "agent-1",
            "action": {},
            "policy_name": "standard",
            "priority": "high",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn cost_request_defaults_rate_and_coverage() {
        let request: CostReportRequest =
            serde_json::from_value(json!({"framework": "gdpr"})).unwrap();
        assert!(request.automation_coverage.is_empty());
        assert!((request.hourly_rate - DEFAULT_HOURLY_RATE).abs() < f64::EPSILON);
    }

    #[test]
    fn cost_request_rejects_unknown_automation_level() {
        let result = serde_json::from_value::<CostReportRequest>(json!({
            "framework": "gdpr",
            "automation_coverage": {"A30_ropa": "magically_automated"},
        }));
        assert!(result.is_err());
    }
}
