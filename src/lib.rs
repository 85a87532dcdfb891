pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod facade;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::error::{Error, Result};
use crate::services::{audit_service::AuditService, retention_service::RetentionSweeper};
use crate::store::{MemoryAuditStore, PgAuditStore, StoreHandle};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: StoreHandle,
    pub audit_service: AuditService,
    pub retention_sweeper: RetentionSweeper,
}

impl AppState {
    pub fn new(config: Config, store: StoreHandle) -> Self {
        let audit_service = AuditService::with_list_cap(store.clone(), config.list_limit);
        let retention_sweeper =
            RetentionSweeper::with_default_days(store.clone(), config.retention_days);

        Self {
            config: Arc::new(config),
            store,
            audit_service,
            retention_sweeper,
        }
    }
}

pub async fn open_store(config: &Config) -> Result<StoreHandle> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| Error::Config("DATABASE_URL is required".to_string()))?;
            let store = PgAuditStore::open(url, config.database_max_connections).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory audit store; entries are lost on restart");
            Ok(Arc::new(MemoryAuditStore::open()))
        }
    }
}
