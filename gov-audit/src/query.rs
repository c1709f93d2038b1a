//! Conjunctive query filters over the audit ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{AuditEntry, AuditVerdict};

/// Maximum entries returned when a query does not set a limit.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

/// Filter set for audit queries.
///
/// All supplied criteria are ANDed: no entry is returned unless it matches
/// every one of them. Results are always most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditQuery {
    /// Exact match on the acting agent's identifier.
    pub agent_id: Option<String>,
    /// Exact match on the policy that produced the verdict.
    pub policy_name: Option<String>,
    /// Exact match on the overall verdict.
    pub verdict: Option<AuditVerdict>,
    /// Include only entries at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Include only entries at or before this instant.
    pub until: Option<DateTime<Utc>>,
    /// Maximum number of entries to return.
    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            agent_id: None,
            policy_name: None,
            verdict: None,
            since: None,
            until: None,
            limit: default_limit(),
        }
    }
}

impl AuditQuery {
    /// A query matching everything, capped at the default limit.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filters on the acting agent.
    #[must_use]
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Filters on the policy name.
    #[must_use]
    pub fn with_policy_name(mut self, policy_name: impl Into<String>) -> Self {
        self.policy_name = Some(policy_name.into());
        self
    }

    /// Filters on the overall verdict.
    #[must_use]
    pub fn with_verdict(mut self, verdict: AuditVerdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    /// Restricts to entries at or after the given instant.
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Restricts to entries at or before the given instant.
    #[must_use]
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Caps the number of returned entries.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether the entry satisfies every supplied criterion.
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(agent_id) = &self.agent_id
            && entry.agent_id() != agent_id
        {
            return false;
        }
        if let Some(policy_name) = &self.policy_name
            && entry.policy_name() != policy_name
        {
            return false;
        }
        if let Some(verdict) = self.verdict
            && entry.verdict() != verdict
        {
            return false;
        }
        if let Some(since) = self.since
            && entry.timestamp() < since
        {
            return false;
        }
        if let Some(until) = self.until
            && entry.timestamp() > until
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_uses_default_limit() {
        let query: AuditQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, DEFAULT_QUERY_LIMIT);
        assert_eq!(query, AuditQuery::all());
    }

    #[test]
    fn wire_verdict_filter_parses() {
        let query: AuditQuery =
            serde_json::from_str(r#"{"verdict": "fail", "agent_id": "agent-1"}"#).unwrap();
        assert_eq!(query.verdict, Some(AuditVerdict::Fail));
        assert_eq!(query.agent_id.as_deref(), Some("agent-1"));
    }

    #[test]
    fn unknown_verdict_value_is_rejected() {
        let result = serde_json::from_str::<AuditQuery>(r#"{"verdict": "maybe"}"#);
        assert!(result.is_err());
    }
}
