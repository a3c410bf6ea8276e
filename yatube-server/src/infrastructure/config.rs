use serde::Deserialize;

use crate::domain::page::DEFAULT_PAGE_SIZE;
use crate::infrastructure::logging::LogFormat;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub page_size: u32,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    /// Accounts with these usernames are administrators.
    #[serde(default)]
    pub admin_usernames: Vec<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    #[serde(skip)]
    pub log_format: LogFormat,
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = var("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url =
            var("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            var("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = comma_list(&var("CORS_ORIGINS").unwrap_or_else(|| "*".into()));
        let admin_usernames = var("ADMIN_USERNAMES")
            .map(|v| comma_list(&v))
            .unwrap_or_default();

        let page_size = var("PAGE_SIZE")
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid PAGE_SIZE: {}", e))?
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be at least 1");
        }

        let access_token_ttl_secs = var("ACCESS_TOKEN_TTL_SECS")
            .map(|v| v.parse::<i64>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid ACCESS_TOKEN_TTL_SECS: {}", e))?
            .unwrap_or(3600);
        let refresh_token_ttl_secs = var("REFRESH_TOKEN_TTL_SECS")
            .map(|v| v.parse::<i64>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid REFRESH_TOKEN_TTL_SECS: {}", e))?
            .unwrap_or(3600 * 24);

        let db_max_connections = var("DB_MAX_CONNECTIONS")
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid DB_MAX_CONNECTIONS: {}", e))?
            .unwrap_or(20);
        if db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        let db_acquire_timeout_secs = var("DB_ACQUIRE_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid DB_ACQUIRE_TIMEOUT_SECS: {}", e))?
            .unwrap_or(5);
        let log_format = var("LOG_FORMAT")
            .map(|v| v.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            cors_origins,
            page_size,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            admin_usernames,
            db_max_connections,
            db_acquire_timeout_secs,
            log_format,
        })
    }
}
