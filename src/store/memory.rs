use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::audit_log::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};
use crate::store::AuditStore;

/// Not durable. Used by tests and `AUDIT_STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditLogEntry>>,
    closed: AtomicBool,
}

impl MemoryAuditStore {
    pub fn open() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Persistence("audit store is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry> {
        self.ensure_open()?;
        if entry.action.trim().is_empty() {
            return Err(Error::Persistence("action must not be empty".to_string()));
        }

        let record = AuditLogEntry {
            id: Uuid::new_v4(),
            action: entry.action,
            details: entry.details,
            user_id: entry.user_id,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            timestamp: entry.timestamp.unwrap_or_else(Utc::now),
        };
        self.entries.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self, filter: &AuditLogFilter, limit: i64) -> Result<Vec<AuditLogEntry>> {
        self.ensure_open()?;
        let limit = usize::try_from(limit).unwrap_or(0);

        let entries = self.entries.read().await;
        // Reverse first so equal timestamps come out newest-insert-first after the stable sort.
        let mut matching: Vec<AuditLogEntry> = entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.ensure_open()?;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.timestamp >= cutoff);
        Ok((before - entries.len()) as u64)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
