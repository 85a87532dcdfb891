pub mod audit_dto;
