pub mod http;
pub mod server;

use tracing::warn;

pub use crate::dto::audit_dto::CreateAuditLogPayload as LogActionParams;
pub use http::HttpActionLogger;
pub use server::ServerActionLogger;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("invalid log parameters: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("failed to serialize log parameters: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid logging endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("logging endpoint answered {0}")]
    Status(u16),

    #[error("audit store error: {0}")]
    Persistence(String),
}

#[async_trait::async_trait]
pub trait ActionLogger: Send + Sync {
    async fn try_log(&self, params: &LogActionParams) -> Result<(), LogError>;

    /// `true` once the entry is stored. Failures are only logged.
    async fn log_action(&self, params: &LogActionParams) -> bool {
        match self.try_log(params).await {
            Ok(()) => true,
            Err(e) => {
                warn!(action = %params.action, error = %e, "audit log write dropped");
                false
            }
        }
    }
}
