use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Fallback for provenance fields when a request carries no usable value.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub action: String,
    pub details: Option<String>,
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAuditLogEntry {
    pub action: String,
    pub details: Option<String>,
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewAuditLogEntry {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn provenance(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogFilter {
    pub action: Option<String>,
    pub user_id: Option<String>,
}

impl AuditLogFilter {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.action.as_deref().map_or(true, |a| entry.action == a)
            && self
                .user_id
                .as_deref()
                .map_or(true, |u| entry.user_id.as_deref() == Some(u))
    }
}

/// Labels used by this service. Clients may send any other label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    UserRegistered,
    UserLogin,
    UserLogout,
    PasswordReset,
    SettingsUpdated,
    ClientError,
    AuditLogsPurged,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRegistered => "USER_REGISTERED",
            AuditAction::UserLogin => "USER_LOGIN",
            AuditAction::UserLogout => "USER_LOGOUT",
            AuditAction::PasswordReset => "PASSWORD_RESET",
            AuditAction::SettingsUpdated => "SETTINGS_UPDATED",
            AuditAction::ClientError => "CLIENT_ERROR",
            AuditAction::AuditLogsPurged => "AUDIT_LOGS_PURGED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        action.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: &str, user_id: Option<&str>) -> AuditLogEntry {
        AuditLogEntry {
            id: Uuid::new_v4(),
            action: action.to_string(),
            details: None,
            user_id: user_id.map(str::to_string),
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = AuditLogFilter::default();
        assert!(filter.matches(&entry("USER_LOGIN", None)));
        assert!(filter.matches(&entry("CLIENT_ERROR", Some("u1"))));
    }

    #[test]
    fn filter_requires_every_given_field() {
        let filter = AuditLogFilter {
            action: Some("USER_LOGIN".into()),
            user_id: Some("u1".into()),
        };
        assert!(filter.matches(&entry("USER_LOGIN", Some("u1"))));
        assert!(!filter.matches(&entry("USER_LOGIN", Some("u2"))));
        assert!(!filter.matches(&entry("USER_LOGIN", None)));
        assert!(!filter.matches(&entry("USER_LOGOUT", Some("u1"))));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(entry("USER_REGISTERED", Some("u1"))).unwrap();
        assert_eq!(value["userId"], "u1");
        assert!(value.get("ipAddress").is_some());
        assert!(value.get("timestamp").is_some());
        assert_eq!(AuditAction::UserRegistered.to_string(), "USER_REGISTERED");
    }
}
