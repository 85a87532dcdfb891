pub mod audit_service;
pub mod retention_service;
