//! Role membership checks for agent actions.

use serde_json::{Map, Value, json};

use gov_primitives::AgentAction;

use crate::catalogue::{EvaluationFault, RuleEvaluator, RuleOutcome};

const DEFAULT_ROLE_FIELD: &str = "agent_role";

/// Verifies the acting agent holds one of the allowed roles.
///
/// Rule type: `role_check`. An absent role field is a failure, not a skip —
/// absence of proof is not proof of compliance.
#[derive(Debug, Default)]
pub struct RoleCheckRule;

impl RoleCheckRule {
    /// Catalogue key for this rule.
    pub const TYPE: &'static str = "role_check";
}

fn allowed_roles(params: &Map<String, Value>) -> Result<Vec<String>, EvaluationFault> {
    let Some(raw) = params.get("allowed_roles") else {
        return Err(EvaluationFault::new(
            "role_check requires an `allowed_roles` list",
        ));
    };
    let Some(items) = raw.as_array() else {
        return Err(EvaluationFault::new("`allowed_roles` must be a list"));
    };
    let roles: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    if roles.is_empty() || roles.len() != items.len() {
        return Err(EvaluationFault::new(
            "`allowed_roles` must be a non-empty list of strings",
        ));
    }
    Ok(roles)
}

fn agent_roles(value: &Value) -> Vec<String> {
    match value {
        Value::String(role) => vec![role.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

impl RuleEvaluator for RoleCheckRule {
    fn evaluate(
        &self,
        action: &AgentAction,
        params: &Map<String, Value>,
    ) -> Result<RuleOutcome, EvaluationFault> {
        let allowed = allowed_roles(params)?;
        let role_field = params
            .get("role_field")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ROLE_FIELD);

        let Some(raw_role) = action.lookup(role_field) else {
            let mut details = Map::new();
            details.insert("role_field".into(), json!(role_field));
            details.insert("allowed_roles".into(), json!(allowed));
            return Ok(RuleOutcome::fail_with_details(
                format!("action has no `{role_field}` field; cannot verify agent role"),
                details,
            ));
        };

        let held = agent_roles(raw_role);
        if let Some(matched) = held.iter().find(|role| allowed.contains(role)) {
            let mut details = Map::new();
            details.insert("matched_role".into(), json!(matched));
            return Ok(RuleOutcome::pass_with_details(details));
        }

        let mut details = Map::new();
        details.insert("role_field".into(), json!(role_field));
        details.insert("agent_roles".into(), json!(held));
        details.insert("allowed_roles".into(), json!(allowed));
        Ok(RuleOutcome::fail_with_details(
            format!(
                "agent role(s) {held:?} are not in the allowed set {allowed:?}",
                held = held,
                allowed = allowed
            ),
            details,
        ))
    }

    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(fault) = allowed_roles(params) {
            errors.push(format!("role_check: {}", fault.reason));
        }
        if let Some(field) = params.get("role_field")
            && !field.is_string()
        {
            errors.push("role_check: `role_field` must be a string".to_owned());
        }
        errors
    }
}
