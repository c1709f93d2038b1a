//! Store contract and the in-memory implementation.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::entry::AuditEntry;
use crate::error::AuditResult;
use crate::query::AuditQuery;

/// Trait implemented by audit ledgers.
///
/// Appends must be serialized by the implementation (single-writer
/// discipline) so that for entries `a` appended before `b`, every query whose
/// filters admit both yields `b` before `a`. No method mutates or removes an
/// existing entry.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends one entry to the ledger, stamping its sequence number.
    async fn append(&self, entry: AuditEntry) -> AuditResult<()>;

    /// Returns matching entries, most-recent-first, capped at the query
    /// limit. A limited result is a prefix of the unlimited one.
    async fn query(&self, query: &AuditQuery) -> AuditResult<Vec<AuditEntry>>;

    /// Total number of entries in the ledger.
    async fn count(&self) -> AuditResult<usize>;
}

/// Volatile, process-local audit store.
///
/// The write lock is the single-writer queue: sequence stamping and the push
/// happen under one exclusive section. Readers take a consistent snapshot and
/// may run concurrently with each other.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    inner: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: AuditEntry) -> AuditResult<()> {
        let mut inner = self.inner.write().expect("audit store poisoned");
        let seq = inner.len() as u64;
        inner.push(entry.with_seq(seq));
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> AuditResult<Vec<AuditEntry>> {
        let inner = self.inner.read().expect("audit store poisoned");
        Ok(inner
            .iter()
            .rev()
            .filter(|entry| query.matches(entry))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AuditResult<usize> {
        let inner = self.inner.read().expect("audit store poisoned");
        Ok(inner.len())
    }
}
