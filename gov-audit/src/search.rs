//! Aggregation helpers over audit query results.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::entry::{AuditEntry, AuditVerdict};

/// Counts entries grouped by verdict label.
#[must_use]
pub fn aggregate_verdicts(entries: &[AuditEntry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts
            .entry(entry.verdict().as_str().to_owned())
            .or_insert(0) += 1;
    }
    counts
}

/// Summary statistics for a slice of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStats {
    /// Total entries inspected.
    pub total: usize,
    /// Entries with an overall pass verdict.
    pub pass_count: usize,
    /// Entries with an overall fail verdict.
    pub fail_count: usize,
    /// Distinct agent identifiers, sorted.
    pub agents: Vec<String>,
    /// Distinct policy names, sorted.
    pub policies: Vec<String>,
}

/// Computes summary statistics over the supplied entries.
#[must_use]
pub fn stats(entries: &[AuditEntry]) -> AuditStats {
    let mut agents = BTreeSet::new();
    let mut policies = BTreeSet::new();
    let mut pass_count = 0;

    for entry in entries {
        agents.insert(entry.agent_id().to_owned());
        policies.insert(entry.policy_name().to_owned());
        if entry.verdict() == AuditVerdict::Pass {
            pass_count += 1;
        }
    }

    AuditStats {
        total: entries.len(),
        pass_count,
        fail_count: entries.len() - pass_count,
        agents: agents.into_iter().collect(),
        policies: policies.into_iter().collect(),
    }
}
