use tracing::debug;

use crate::config::DEFAULT_LIST_LIMIT;
use crate::dto::audit_dto::CreateAuditLogPayload;
use crate::error::Result;
use crate::models::audit_log::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};
use crate::store::{AuditStore, StoreHandle};

#[derive(Clone)]
pub struct AuditService {
    store: StoreHandle,
    list_cap: i64,
}

impl AuditService {
    pub fn new(store: StoreHandle) -> Self {
        Self::with_list_cap(store, DEFAULT_LIST_LIMIT)
    }

    pub fn with_list_cap(store: StoreHandle, list_cap: i64) -> Self {
        Self {
            store,
            list_cap: list_cap.max(1),
        }
    }

    pub fn list_cap(&self) -> i64 {
        self.list_cap
    }

    pub async fn append(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry> {
        let created = self.store.append(entry).await?;
        debug!(id = %created.id, action = %created.action, "audit entry appended");
        Ok(created)
    }

    pub async fn log(
        &self,
        payload: CreateAuditLogPayload,
        ip_address: String,
        user_agent: String,
    ) -> Result<AuditLogEntry> {
        self.append(payload.into_entry().provenance(ip_address, user_agent))
            .await
    }

    /// Newest-first listing; `limit` is clamped into `1..=list_cap`.
    pub async fn list_recent(
        &self,
        filter: &AuditLogFilter,
        limit: Option<i64>,
    ) -> Result<Vec<AuditLogEntry>> {
        let limit = limit.unwrap_or(self.list_cap).clamp(1, self.list_cap);
        self.store.list_recent(filter, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AuditStore, MemoryAuditStore, MockAuditStore};
    use mockall::predicate::{always, eq};
    use std::sync::Arc;

    #[tokio::test]
    async fn log_records_provenance() {
        let store = Arc::new(MemoryAuditStore::open());
        let service = AuditService::new(store.clone());

        let created = service
            .log(
                CreateAuditLogPayload::new("USER_LOGIN").with_user("u1"),
                "203.0.113.7".into(),
                "unknown".into(),
            )
            .await
            .unwrap();

        assert_eq!(created.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(created.user_agent.as_deref(), Some("unknown"));
        let listed = store
            .list_recent(&AuditLogFilter::default(), 10)
            .await
            .unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn clamps_requested_limit_to_cap() {
        let mut store = MockAuditStore::new();
        store
            .expect_list_recent()
            .with(always(), eq(100))
            .times(2)
            .returning(|_, _| Ok(Vec::new()));
        store
            .expect_list_recent()
            .with(always(), eq(1))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let service = AuditService::new(Arc::new(store));
        let filter = AuditLogFilter::default();

        service.list_recent(&filter, None).await.unwrap();
        service.list_recent(&filter, Some(5000)).await.unwrap();
        service.list_recent(&filter, Some(-3)).await.unwrap();
    }

    #[tokio::test]
    async fn propagates_store_failures() {
        let mut store = MockAuditStore::new();
        store
            .expect_append()
            .returning(|_| Err(crate::error::Error::Persistence("down".into())));
        let service = AuditService::new(Arc::new(store));

        let err = service
            .append(NewAuditLogEntry::new("USER_LOGIN"))
            .await
            .unwrap_err();
        assert!(err.is_persistence());
    }
}
