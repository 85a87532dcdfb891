use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::config::{DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS};
use crate::error::{Error, Result};
use crate::models::audit_log::{AuditAction, NewAuditLogEntry};
use crate::store::{AuditStore, StoreHandle};
use crate::utils::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub deleted: u64,
    pub cutoff: DateTime<Utc>,
    pub retention_days: u32,
}

/// Deletes audit entries older than the retention window. Never retries.
#[derive(Clone)]
pub struct RetentionSweeper {
    store: StoreHandle,
    default_days: u32,
}

impl RetentionSweeper {
    pub fn new(store: StoreHandle) -> Self {
        Self::with_default_days(store, DEFAULT_RETENTION_DAYS)
    }

    pub fn with_default_days(store: StoreHandle, default_days: u32) -> Self {
        Self {
            store,
            default_days,
        }
    }

    pub fn default_days(&self) -> u32 {
        self.default_days
    }

    pub async fn sweep_default(&self) -> Result<SweepOutcome> {
        self.sweep(self.default_days).await
    }

    pub async fn sweep(&self, retention_days: u32) -> Result<SweepOutcome> {
        self.sweep_at(time::now(), retention_days).await
    }

    /// Sweep with `now` fixed by the caller. The cutoff is derived once, so
    /// entries appended while the delete runs are never eligible.
    pub async fn sweep_at(&self, now: DateTime<Utc>, retention_days: u32) -> Result<SweepOutcome> {
        if retention_days > MAX_RETENTION_DAYS {
            return Err(Error::BadRequest(format!(
                "retention window must be at most {} days",
                MAX_RETENTION_DAYS
            )));
        }
        let cutoff = time::days_before(now, retention_days)
            .ok_or_else(|| Error::BadRequest("retention window out of range".into()))?;
        let deleted = self.store.delete_older_than(cutoff).await?;
        info!(deleted, retention_days, %cutoff, "audit retention sweep finished");

        if deleted > 0 {
            self.record_purge(deleted, cutoff, retention_days).await;
        }

        Ok(SweepOutcome {
            deleted,
            cutoff,
            retention_days,
        })
    }

    async fn record_purge(&self, deleted: u64, cutoff: DateTime<Utc>, retention_days: u32) {
        let details = json!({
            "deleted": deleted,
            "cutoff": cutoff,
            "retentionDays": retention_days,
        });
        let entry = NewAuditLogEntry::new(AuditAction::AuditLogsPurged)
            .details(details.to_string())
            .at(time::now().max(cutoff));
        if let Err(e) = self.store.append(entry).await {
            warn!(error = %e, "failed to record audit purge");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::audit_log::AuditLogFilter;
    use crate::store::{AuditStore, MemoryAuditStore, MockAuditStore};
    use chrono::{Duration, TimeZone};
    use mockall::predicate::eq;
    use std::sync::Arc;

    async fn seeded(now: DateTime<Utc>, ages_in_days: &[i64]) -> Arc<MemoryAuditStore> {
        let store = Arc::new(MemoryAuditStore::open());
        for age in ages_in_days {
            store
                .append(NewAuditLogEntry::new("USER_LOGIN").at(now - Duration::days(*age)))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn default_window_deletes_only_the_91_day_old_entry() {
        let now = Utc::now();
        let store = seeded(now, &[91, 1]).await;
        let sweeper = RetentionSweeper::new(store.clone());

        let outcome = sweeper.sweep_at(now, sweeper.default_days()).await.unwrap();

        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.retention_days, 90);
        assert_eq!(outcome.cutoff, now - Duration::days(90));
        let logins = store
            .list_recent(
                &AuditLogFilter {
                    action: Some("USER_LOGIN".into()),
                    user_id: None,
                },
                10,
            )
            .await
            .unwrap();
        assert_eq!(logins.len(), 1);
    }

    #[tokio::test]
    async fn no_entry_older_than_cutoff_remains() {
        let now = Utc::now();
        for days in [0u32, 1, 7, 30, 90, 365] {
            let store = seeded(now, &[0, 1, 5, 29, 31, 89, 91, 400]).await;
            let sweeper = RetentionSweeper::new(store.clone());
            let outcome = sweeper.sweep_at(now, days).await.unwrap();

            let remaining = store
                .list_recent(&AuditLogFilter::default(), 100)
                .await
                .unwrap();
            assert!(remaining.iter().all(|e| e.timestamp >= outcome.cutoff));
        }
    }

    #[tokio::test]
    async fn zero_day_window_clears_everything_already_persisted() {
        let now = Utc::now();
        let store = seeded(now, &[0, 3, 200]).await;
        let sweeper = RetentionSweeper::new(store.clone());

        // Entries at exactly `now` are not strictly older than the cutoff.
        let outcome = sweeper.sweep_at(now + Duration::seconds(1), 0).await.unwrap();
        assert_eq!(outcome.deleted, 3);
    }

    #[tokio::test]
    async fn repeated_sweep_with_same_cutoff_deletes_nothing() {
        let now = Utc::now();
        let store = seeded(now, &[120, 100, 10]).await;
        let sweeper = RetentionSweeper::new(store.clone());

        assert_eq!(sweeper.sweep_at(now, 90).await.unwrap().deleted, 2);
        assert_eq!(sweeper.sweep_at(now, 90).await.unwrap().deleted, 0);
    }

    #[tokio::test]
    async fn records_purge_entry_after_deleting() {
        let now = Utc::now();
        let store = seeded(now, &[120]).await;
        let sweeper = RetentionSweeper::new(store.clone());
        sweeper.sweep_at(now, 90).await.unwrap();

        let purges = store
            .list_recent(
                &AuditLogFilter {
                    action: Some("AUDIT_LOGS_PURGED".into()),
                    user_id: None,
                },
                10,
            )
            .await
            .unwrap();
        assert_eq!(purges.len(), 1);
        let details: serde_json::Value =
            serde_json::from_str(purges[0].details.as_deref().unwrap()).unwrap();
        assert_eq!(details["deleted"], 1);
        assert_eq!(details["retentionDays"], 90);
    }

    #[tokio::test]
    async fn computes_cutoff_once_and_passes_it_to_the_store() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 25, 0, 0, 0).unwrap();
        let mut store = MockAuditStore::new();
        store
            .expect_delete_older_than()
            .with(eq(expected))
            .times(1)
            .returning(|_| Ok(0));

        let sweeper = RetentionSweeper::new(Arc::new(store));
        let outcome = sweeper.sweep_at(now, 7).await.unwrap();
        assert_eq!(outcome.cutoff, expected);
        assert_eq!(outcome.deleted, 0);
    }

    #[tokio::test]
    async fn rejects_oversized_window_without_touching_the_store() {
        let mut store = MockAuditStore::new();
        store.expect_delete_older_than().never();
        store.expect_append().never();

        let sweeper = RetentionSweeper::new(Arc::new(store));
        for days in [MAX_RETENTION_DAYS + 1, 200_000_000, u32::MAX] {
            let err = sweeper.sweep(days).await.unwrap_err();
            assert!(matches!(err, Error::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn accepts_the_largest_allowed_window() {
        let now = Utc::now();
        let store = seeded(now, &[40_000, 1]).await;
        let sweeper = RetentionSweeper::new(store.clone());
        let outcome = sweeper.sweep_at(now, MAX_RETENTION_DAYS).await.unwrap();
        assert_eq!(outcome.deleted, 1);
    }

    #[tokio::test]
    async fn propagates_store_failure_without_retrying() {
        let mut store = MockAuditStore::new();
        store
            .expect_delete_older_than()
            .times(1)
            .returning(|_| Err(Error::Persistence("unreachable".into())));
        store.expect_append().never();

        let sweeper = RetentionSweeper::new(Arc::new(store));
        let err = sweeper.sweep(90).await.unwrap_err();
        assert!(err.is_persistence());
    }

    #[tokio::test]
    async fn purge_record_failure_does_not_change_the_result() {
        let mut store = MockAuditStore::new();
        store.expect_delete_older_than().returning(|_| Ok(4));
        store
            .expect_append()
            .times(1)
            .returning(|_| Err(Error::Persistence("write failed".into())));

        let sweeper = RetentionSweeper::new(Arc::new(store));
        assert_eq!(sweeper.sweep(30).await.unwrap().deleted, 4);
    }
}
