//! Durable newline-delimited JSON audit store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::entry::AuditEntry;
use crate::error::AuditResult;
use crate::query::AuditQuery;
use crate::store::AuditStore;

struct Writer {
    file: tokio::fs::File,
    next_seq: u64,
}

/// File-backed audit store writing one JSON entry per line.
///
/// The file is opened in append mode, so existing entries are never
/// overwritten; each append is one atomic line write under the writer lock.
/// Corrupt lines encountered while reading are skipped with a warning so a
/// partially damaged ledger stays queryable.
pub struct JsonlAuditStore {
    path: PathBuf,
    writer: Mutex<Writer>,
}

impl JsonlAuditStore {
    /// Opens (or creates) the ledger file at the provided path, resuming the
    /// append sequence from the entries already present.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors encountered while preparing the file.
    pub async fn open(path: impl Into<PathBuf>) -> AuditResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .await?;

        let next_seq = read_entries(&path).await?.len() as u64;

        Ok(Self {
            path,
            writer: Mutex::new(Writer { file, next_seq }),
        })
    }

    /// Returns the underlying path of the ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn read_entries(path: &Path) -> AuditResult<Vec<AuditEntry>> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut entries = Vec::new();
    for (line_number, chunk) in data
        .split(|byte| *byte == b'\n')
        .filter(|chunk| !chunk.is_empty())
        .enumerate()
    {
        match serde_json::from_slice::<AuditEntry>(chunk) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    line = line_number + 1,
                    "skipping corrupt audit line: {err}"
                );
            }
        }
    }
    Ok(entries)
}

#[async_trait]
impl AuditStore for JsonlAuditStore {
    async fn append(&self, entry: AuditEntry) -> AuditResult<()> {
        let mut writer = self.writer.lock().await;
        let entry = entry.with_seq(writer.next_seq);
        let line = serde_json::to_vec(&entry)?;

        writer.file.write_all(&line).await?;
        writer.file.write_u8(b'\n').await?;
        writer.file.flush().await?;
        writer.next_seq += 1;
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> AuditResult<Vec<AuditEntry>> {
        let mut entries = read_entries(&self.path).await?;
        entries.retain(|entry| query.matches(entry));
        entries.sort_by(|a, b| b.seq().cmp(&a.seq()));
        entries.truncate(query.limit);
        Ok(entries)
    }

    async fn count(&self) -> AuditResult<usize> {
        Ok(read_entries(&self.path).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use gov_policy::{ComplianceReport, RuleVerdict};
    use gov_primitives::Severity;

    use crate::entry::AuditVerdict;

    fn temp_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("audit-ledger-{}.jsonl", Uuid::new_v4()));
        path
    }

    fn entry(agent_id: &str, passed: bool) -> AuditEntry {
        let verdicts = vec![RuleVerdict::new(
            "limit-spend",
            passed,
            Severity::High,
            "",
            serde_json::Map::new(),
        )];
        let report = ComplianceReport::new(
            "standard",
            serde_json::from_value(json!({"type": "search"})).unwrap(),
            verdicts,
            Utc::now(),
        );
        AuditEntry::from_report(&report, agent_id, BTreeMap::new())
    }

    #[tokio::test]
    async fn append_and_query_round_trip() {
        let path = temp_path();
        let store = JsonlAuditStore::open(&path).await.unwrap();

        store.append(entry("agent-1", true)).await.unwrap();
        store.append(entry("agent-2", false)).await.unwrap();
        store.append(entry("agent-3", false)).await.unwrap();

        let results = store.query(&AuditQuery::all()).await.unwrap();
        let agents: Vec<_> = results.iter().map(AuditEntry::agent_id).collect();
        assert_eq!(agents, vec!["agent-3", "agent-2", "agent-1"]);

        let failures = store
            .query(&AuditQuery::all().with_verdict(AuditVerdict::Fail))
            .await
            .unwrap();
        assert_eq!(failures.len(), 2);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn sequence_resumes_after_reopen() {
        let path = temp_path();
        {
            let store = JsonlAuditStore::open(&path).await.unwrap();
            store.append(entry("agent-1", true)).await.unwrap();
        }

        let store = JsonlAuditStore::open(&path).await.unwrap();
        store.append(entry("agent-2", true)).await.unwrap();

        let results = store.query(&AuditQuery::all()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].agent_id(), "agent-2");
        assert_eq!(results[0].seq(), 1);
        assert_eq!(results[1].seq(), 0);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn corrupt_lines_are_skipped() {
        let path = temp_path();
        let store = JsonlAuditStore::open(&path).await.unwrap();
        store.append(entry("agent-1", true)).await.unwrap();

        // Damage the ledger by hand.
        {
            use std::io::Write as _;
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&path)
                .unwrap();
            writeln!(file, "{{not json").unwrap();
        }
        store.append(entry("agent-2", true)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        let results = store.query(&AuditQuery::all()).await.unwrap();
        assert_eq!(results.len(), 2);

        let _ = std::fs::remove_file(path);
    }
}
