use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::database::pool::create_pool;
use crate::error::{Error, Result};
use crate::models::audit_log::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};
use crate::store::AuditStore;

#[derive(Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = create_pool(database_url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(max_connections, "audit store opened");
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry> {
        if entry.action.trim().is_empty() {
            return Err(Error::Persistence("action must not be empty".to_string()));
        }

        let row = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            INSERT INTO audit_logs (action, details, user_id, ip_address, user_agent, "timestamp")
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
            RETURNING id, action, details, user_id, ip_address, user_agent, "timestamp"
            "#,
        )
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(&entry.user_id)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(entry.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_recent(&self, filter: &AuditLogFilter, limit: i64) -> Result<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, action, details, user_id, ip_address, user_agent, "timestamp"
            FROM audit_logs
            WHERE ($1::TEXT IS NULL OR action = $1)
              AND ($2::TEXT IS NULL OR user_id = $2)
            ORDER BY "timestamp" DESC
            LIMIT $3
            "#,
        )
        .bind(&filter.action)
        .bind(&filter.user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM audit_logs
            WHERE "timestamp" < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("audit store closed");
    }
}
