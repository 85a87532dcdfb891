use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::IntoParams;
use validator::{Validate, ValidationError};

use crate::models::audit_log::{AuditLogFilter, NewAuditLogEntry};

pub const MAX_DETAILS_LEN: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditLogPayload {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "details_within_limit"))]
    pub details: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub user_id: Option<String>,
}

impl CreateAuditLogPayload {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            details: None,
            user_id: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<JsonValue>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn into_entry(self) -> NewAuditLogEntry {
        NewAuditLogEntry {
            action: self.action,
            details: self.details.as_ref().and_then(details_text),
            user_id: self.user_id,
            ..Default::default()
        }
    }
}

/// Strings are stored verbatim, other JSON values in compact form, `null` as absent.
pub fn details_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn details_within_limit(value: &JsonValue) -> Result<(), ValidationError> {
    match details_text(value) {
        Some(text) if text.len() > MAX_DETAILS_LEN => Err(ValidationError::new("too_long")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogListQuery {
    /// Maximum entries, capped at the configured limit.
    pub limit: Option<i64>,
    /// Exact action filter.
    pub action: Option<String>,
    /// Exact user filter.
    pub user_id: Option<String>,
}

impl AuditLogListQuery {
    pub fn filter(&self) -> AuditLogFilter {
        AuditLogFilter {
            action: self.action.clone().filter(|s| !s.is_empty()),
            user_id: self.user_id.clone().filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientErrorPayload {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[validate(length(max = 8000))]
    pub stack: Option<String>,
    #[validate(length(max = 2048))]
    pub url: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CleanupQuery {
    /// Retention window in days; the configured default when absent.
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub deleted: u64,
    pub cutoff: DateTime<Utc>,
}
