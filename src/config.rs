use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

pub const DEFAULT_RETENTION_DAYS: u32 = 90;
pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_RETENTION_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cron_secret: String,
    pub jwt_secret: String,
    pub retention_days: u32,
    pub list_limit: i64,
    pub sweep_interval_hours: Option<u64>,
    pub public_rps: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend = get_env_parse_or("AUDIT_STORE", StoreBackend::Postgres)?;
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "Missing environment variable: DATABASE_URL".to_string(),
            ));
        }

        let retention_days = check_retention_days(get_env_parse_or(
            "AUDIT_RETENTION_DAYS",
            DEFAULT_RETENTION_DAYS,
        )?)?;

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8080"),
            store_backend,
            database_url,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            cron_secret: get_env("CRON_SECRET")?,
            jwt_secret: get_env("JWT_SECRET")?,
            retention_days,
            list_limit: get_env_parse_or("AUDIT_LIST_LIMIT", DEFAULT_LIST_LIMIT)?.max(1),
            sweep_interval_hours: get_env_parse_opt("AUDIT_SWEEP_INTERVAL_HOURS")?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
        })
    }

    pub fn for_memory_store(cron_secret: &str, jwt_secret: &str) -> Self {
        Self {
            server_address: "127.0.0.1:0".to_string(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 1,
            cron_secret: cron_secret.to_string(),
            jwt_secret: jwt_secret.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            list_limit: DEFAULT_LIST_LIMIT,
            sweep_interval_hours: None,
            public_rps: 1000,
        }
    }
}

fn check_retention_days(days: u32) -> Result<u32> {
    if days == 0 || days > MAX_RETENTION_DAYS {
        return Err(Error::Config(format!(
            "AUDIT_RETENTION_DAYS must be between 1 and {}",
            MAX_RETENTION_DAYS
        )));
    }
    Ok(days)
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_opt<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_env_parse_opt(name)?.unwrap_or(default))
}
