use validator::Validate;

use crate::facade::{ActionLogger, LogActionParams, LogError};
use crate::models::audit_log::NewAuditLogEntry;
use crate::services::audit_service::AuditService;

/// Appends directly through the audit service.
#[derive(Clone)]
pub struct ServerActionLogger {
    service: AuditService,
    provenance: Option<(String, String)>,
}

impl ServerActionLogger {
    pub fn new(service: AuditService) -> Self {
        Self {
            service,
            provenance: None,
        }
    }

    pub fn with_provenance(mut self, ip_address: String, user_agent: String) -> Self {
        self.provenance = Some((ip_address, user_agent));
        self
    }

    fn entry(&self, params: &LogActionParams) -> NewAuditLogEntry {
        let entry = params.clone().into_entry();
        match &self.provenance {
            Some((ip, ua)) => entry.provenance(ip.clone(), ua.clone()),
            None => entry,
        }
    }
}

#[async_trait::async_trait]
impl ActionLogger for ServerActionLogger {
    async fn try_log(&self, params: &LogActionParams) -> Result<(), LogError> {
        params.validate()?;
        self.service
            .append(self.entry(params))
            .await
            .map(|_| ())
            .map_err(|e| LogError::Persistence(e.to_string()))
    }
}
