//! Immutable audit log records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gov_policy::ComplianceReport;
use gov_primitives::AgentAction;

/// Overall verdict recorded for an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditVerdict {
    /// Every rule passed.
    Pass,
    /// At least one rule flagged a violation.
    Fail,
}

impl AuditVerdict {
    /// Returns the wire representation of the verdict.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// A single audit record: who, what, when, and the resulting verdict.
///
/// Entries are created exactly once per evaluation and never mutated after
/// a store stamps their append sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    id: Uuid,
    #[serde(default)]
    seq: u64,
    agent_id: String,
    action_type: String,
    action_data: AgentAction,
    verdict: AuditVerdict,
    policy_name: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl AuditEntry {
    /// Derives an entry from an evaluation report.
    ///
    /// The action type comes from the action's conventional `type` field
    /// (falling back to `unknown`), the verdict from the report's overall
    /// outcome, and the timestamp from the report itself so the ledger and
    /// the report agree on when the decision happened.
    #[must_use]
    pub fn from_report(
        report: &ComplianceReport,
        agent_id: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq: 0,
            agent_id: agent_id.into(),
            action_type: report.action().action_type().to_owned(),
            action_data: report.action().clone(),
            verdict: if report.passed() {
                AuditVerdict::Pass
            } else {
                AuditVerdict::Fail
            },
            policy_name: report.policy_name().to_owned(),
            timestamp: report.timestamp(),
            metadata,
        }
    }

    /// Stamps the append sequence. Intended for store implementations only;
    /// the sequence is what makes reverse-append query order explicit.
    #[must_use]
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    /// Unique identifier of this record.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Position in the store's append order.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Identifier of the agent that performed the action.
    #[must_use]
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Category of the action (e.g. `search`, `write`).
    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Full action payload as evaluated.
    #[must_use]
    pub fn action_data(&self) -> &AgentAction {
        &self.action_data
    }

    /// Overall verdict of the evaluation.
    #[must_use]
    pub fn verdict(&self) -> AuditVerdict {
        self.verdict
    }

    /// Name of the policy that produced the verdict.
    #[must_use]
    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }

    /// UTC time of the evaluation.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Additional context (run id, environment, ...).
    #[must_use]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
