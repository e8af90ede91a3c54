use anyhow::{bail, Context, Result};

/// Which `PortalStore` implementation backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage = StorageBackend::parse(
            &std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "postgres".to_string()),
        )?;
        let database_url = match storage {
            StorageBackend::Postgres => Some(require_env("DATABASE_URL")?),
            StorageBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };

        Ok(Config {
            storage,
            database_url,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_ttl_hours: parse_ttl_hours(
                &std::env::var("JWT_TTL_HOURS").unwrap_or_else(|_| "168".to_string()),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration used by the in-process router tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            storage: StorageBackend::Memory,
            database_url: None,
            jwt_secret: "test-secret-do-not-use".to_string(),
            jwt_ttl_hours: 1,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

/// Token lifetime bounds: at least an hour, at most a year.
const JWT_TTL_HOURS_RANGE: std::ops::RangeInclusive<i64> = 1..=8760;

fn parse_ttl_hours(raw: &str) -> Result<i64> {
    let hours = raw
        .trim()
        .parse::<i64>()
        .context("JWT_TTL_HOURS must be a whole number of hours")?;
    if !JWT_TTL_HOURS_RANGE.contains(&hours) {
        bail!("JWT_TTL_HOURS must be between 1 and 8760, got {hours}");
    }
    Ok(hours)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
