//! The governance orchestrator.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use gov_audit::{AuditEntry, AuditError, AuditQuery, AuditStore, MemoryAuditStore};
use gov_compliance::{
    AutomationMultipliers, ComplianceCostReport, ComplianceError, CostCalculator, EvidenceItem,
    FrameworkCatalogue, FrameworkReport,
};
use gov_policy::{
    ComplianceReport, Policy, PolicyEngine, PolicyError, PolicyRegistry, PolicyValidation,
};
use gov_primitives::{Classified, ErrorBody, ErrorClass};
use gov_rules::RuleCatalogue;

use crate::api::{CostReportRequest, EvaluateRequest};

/// Boundary error for the governance engine's external operations.
#[derive(Debug, Error)]
pub enum GovError {
    /// Policy registration or lookup failed.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// An audit query could not be served. Append failures never surface
    /// here; they are logged to the observability channel instead.
    #[error(transparent)]
    Storage(#[from] AuditError),

    /// A compliance catalogue or cost-calculation input was invalid.
    #[error(transparent)]
    Compliance(#[from] ComplianceError),
}

impl Classified for GovError {
    fn classification(&self) -> ErrorClass {
        match self {
            Self::Policy(err) => err.classification(),
            Self::Storage(err) => err.classification(),
            Self::Compliance(err) => err.classification(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Policy(err) => err.label(),
            Self::Storage(err) => err.label(),
            Self::Compliance(err) => err.label(),
        }
    }
}

impl GovError {
    /// Renders the `{error, detail}` wire body for this error.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::from_error(self)
    }
}

/// Orchestrator binding the policy engine, the audit ledger, and the
/// compliance catalogue behind the four external operations.
///
/// Evaluation itself stays pure; this type owns the decide-then-record
/// sequencing so an audit append fault can never block a governance decision.
pub struct GovernanceEngine {
    engine: PolicyEngine,
    policies: PolicyRegistry,
    audit: Arc<dyn AuditStore>,
    frameworks: Arc<FrameworkCatalogue>,
    calculator: CostCalculator,
}

impl std::fmt::Debug for GovernanceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceEngine")
            .field("policies", &self.policies)
            .field("frameworks", &self.frameworks)
            .finish_non_exhaustive()
    }
}

impl Default for GovernanceEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GovernanceEngine {
    /// Starts building an engine.
    #[must_use]
    pub fn builder() -> GovernanceEngineBuilder {
        GovernanceEngineBuilder::default()
    }

    /// Registers a policy for evaluation by name.
    ///
    /// # Errors
    ///
    /// Returns [`GovError::Policy`] when the name is already taken.
    pub fn register_policy(&self, policy: Policy) -> Result<(), GovError> {
        self.policies.register(policy)?;
        Ok(())
    }

    /// Returns the rule catalogue, for registering custom rule types at
    /// process start.
    #[must_use]
    pub fn rule_catalogue(&self) -> &Arc<RuleCatalogue> {
        self.engine.catalogue()
    }

    /// Evaluates an action against a named policy and records the outcome.
    ///
    /// The derived audit entry is appended after evaluation; an append fault
    /// is reported via `tracing::error!` and never fails this call, since
    /// losing an audit write must not block governance decisions.
    ///
    /// # Errors
    ///
    /// Returns [`GovError::Policy`] when the policy name is unknown.
    pub async fn evaluate_action(
        &self,
        request: EvaluateRequest,
    ) -> Result<ComplianceReport, GovError> {
        let policy = self.policies.get(&request.policy_name)?;
        let report = self.engine.evaluate(&policy, &request.action);

        let entry = AuditEntry::from_report(&report, &request.agent_id, BTreeMap::new());
        if let Err(err) = self.audit.append(entry).await {
            error!(
                policy = %request.policy_name,
                agent_id = %request.agent_id,
                "audit append failed, evaluation result still returned: {err}"
            );
        }

        Ok(report)
    }

    /// Queries the audit ledger. Unlike appends, query faults are surfaced:
    /// a query has no result to silently approve.
    ///
    /// # Errors
    ///
    /// Returns [`GovError::Storage`] when the ledger cannot be read.
    pub async fn query_audit(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, GovError> {
        Ok(self.audit.query(query).await?)
    }

    /// Structurally validates a policy, returning every problem found.
    #[must_use]
    pub fn validate_policy(&self, policy: &Policy) -> PolicyValidation {
        self.engine.validate(policy)
    }

    /// Generates a compliance cost report.
    ///
    /// # Errors
    ///
    /// Returns [`GovError::Compliance`] for an unknown framework or a
    /// non-positive hourly rate.
    pub fn generate_cost_report(
        &self,
        request: &CostReportRequest,
    ) -> Result<ComplianceCostReport, GovError> {
        Ok(self.calculator.generate(
            &request.framework,
            &request.automation_coverage,
            request.hourly_rate,
        )?)
    }

    /// Scores supplied evidence against a framework's requirement catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`GovError::Compliance`] for an unknown framework.
    pub fn run_framework_check(
        &self,
        framework: &str,
        evidence: &HashMap<String, EvidenceItem>,
    ) -> Result<FrameworkReport, GovError> {
        Ok(self.frameworks.run_check(framework, evidence)?)
    }
}

/// Builder assembling a [`GovernanceEngine`] from its collaborators.
#[derive(Default)]
pub struct GovernanceEngineBuilder {
    rule_catalogue: Option<Arc<RuleCatalogue>>,
    audit: Option<Arc<dyn AuditStore>>,
    frameworks: Option<Arc<FrameworkCatalogue>>,
    multipliers: Option<AutomationMultipliers>,
}

impl GovernanceEngineBuilder {
    /// Uses a custom rule catalogue instead of the built-ins.
    #[must_use]
    pub fn rule_catalogue(mut self, catalogue: Arc<RuleCatalogue>) -> Self {
        self.rule_catalogue = Some(catalogue);
        self
    }

    /// Uses the supplied audit store instead of the in-memory default.
    #[must_use]
    pub fn audit_store(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.audit = Some(store);
        self
    }

    /// Uses a custom framework catalogue instead of the built-ins.
    #[must_use]
    pub fn framework_catalogue(mut self, catalogue: Arc<FrameworkCatalogue>) -> Self {
        self.frameworks = Some(catalogue);
        self
    }

    /// Overrides the automation-level hour multipliers.
    #[must_use]
    pub fn multipliers(mut self, multipliers: AutomationMultipliers) -> Self {
        self.multipliers = Some(multipliers);
        self
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> GovernanceEngine {
        let rule_catalogue = self
            .rule_catalogue
            .unwrap_or_else(|| Arc::new(RuleCatalogue::with_builtins()));
        let frameworks = self
            .frameworks
            .unwrap_or_else(|| Arc::new(FrameworkCatalogue::with_builtins()));
        let audit = self
            .audit
            .unwrap_or_else(|| Arc::new(MemoryAuditStore::new()));

        let mut calculator = CostCalculator::new(Arc::clone(&frameworks));
        if let Some(multipliers) = self.multipliers {
            calculator = calculator.with_multipliers(multipliers);
        }

        GovernanceEngine {
            engine: PolicyEngine::new(rule_catalogue),
            policies: PolicyRegistry::new(),
            audit,
            frameworks,
            calculator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use gov_audit::AuditVerdict;
    use gov_policy::RuleConfig;
    use gov_primitives::Severity;

    fn engine_with_spend_policy() -> GovernanceEngine {
        let engine = GovernanceEngine::default();
        engine
            .register_policy(
                Policy::new("spend-guard").with_rule(
                    RuleConfig::new("limit-spend", "cost_limit")
                        .with_severity(Severity::High)
                        .with_param("max_cost", json!(0.05)),
                ),
            )
            .unwrap();
        engine
    }

    fn request(agent_id: &str, action: serde_json::Value) -> EvaluateRequest {
        EvaluateRequest {
            agent_id: agent_id.to_owned(),
            action: serde_json::from_value(action).unwrap(),
            policy_name: "spend-guard".to_owned(),
        }
    }

    #[tokio::test]
    async fn evaluation_appends_audit_entry() {
        let engine = engine_with_spend_policy();

        let report = engine
            .evaluate_action(request("agent-1", json!({"type": "purchase", "cost": 0.10})))
            .await
            .unwrap();
        assert!(!report.passed());

        let entries = engine.query_audit(&AuditQuery::all()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].agent_id(), "agent-1");
        assert_eq!(entries[0].action_type(), "purchase");
        assert_eq!(entries[0].verdict(), AuditVerdict::Fail);
        assert_eq!(entries[0].policy_name(), "spend-guard");
    }

    #[tokio::test]
    async fn unknown_policy_is_a_client_fault() {
        let engine = GovernanceEngine::default();
        let err = engine
            .evaluate_action(request("agent-1", json!({})))
            .await
            .expect_err("unknown policy must error");

        assert_eq!(err.classification(), ErrorClass::ClientFault);
        let body = err.to_body();
        assert_eq!(body.error, "unknown_policy");
        assert!(body.detail.contains("spend-guard"));
    }

    #[tokio::test]
    async fn duplicate_policy_registration_errors() {
        let engine = engine_with_spend_policy();
        let err = engine
            .register_policy(Policy::new("spend-guard"))
            .expect_err("duplicate policy must error");
        assert_eq!(err.to_body().error, "duplicate_policy");
    }

    #[test]
    fn cost_report_flows_through_the_calculator() {
        let engine = GovernanceEngine::default();
        let report = engine
            .generate_cost_report(&CostReportRequest::new("hipaa"))
            .unwrap();
        assert_eq!(report.total_requirements(), 12);

        let err = engine
            .generate_cost_report(&CostReportRequest::new("unknown"))
            .expect_err("unknown framework must error");
        assert_eq!(err.to_body().error, "unknown_framework");
        assert_eq!(err.classification(), ErrorClass::ClientFault);
    }

    #[test]
    fn framework_check_flows_through_the_catalogue() {
        let engine = GovernanceEngine::default();
        let report = engine
            .run_framework_check("soc2", &HashMap::new())
            .unwrap();
        assert_eq!(report.skipped_count(), 5);
    }

    #[test]
    fn custom_rule_types_register_through_the_facade() {
        use gov_rules::{EvaluationFault, RuleEvaluator, RuleOutcome};

        struct DenyAll;
        impl RuleEvaluator for DenyAll {
            fn evaluate(
                &self,
                _action: &gov_primitives::AgentAction,
                _params: &serde_json::Map<String, serde_json::Value>,
            ) -> Result<RuleOutcome, EvaluationFault> {
                Ok(RuleOutcome::fail("denied by default"))
            }
        }

        let engine = GovernanceEngine::default();
        engine
            .rule_catalogue()
            .register("deny_all", DenyAll)
            .unwrap();

        let validation = engine.validate_policy(
            &Policy::new("lockdown").with_rule(RuleConfig::new("deny", "deny_all")),
        );
        assert!(validation.valid());
    }
}
