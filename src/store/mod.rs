pub mod memory;
pub mod postgres;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::models::audit_log::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};

pub use memory::MemoryAuditStore;
pub use postgres::PgAuditStore;

pub type StoreHandle = Arc<dyn AuditStore>;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry>;

    async fn list_recent(&self, filter: &AuditLogFilter, limit: i64) -> Result<Vec<AuditLogEntry>>;

    /// Deletes rows with `timestamp < cutoff`.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn close(&self);
}
