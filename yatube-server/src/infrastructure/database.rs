use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::infrastructure::config::AppConfig;

fn pool_options(config: &AppConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_max_connections.min(2))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
}

pub async fn create_pool(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    let pool = pool_options(config).connect(&config.database_url).await?;
    info!(
        max_connections = config.db_max_connections,
        "connected to PostgreSQL"
    );
    Ok(pool)
}

/// Applies the embedded `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let migrator = sqlx::migrate!();
    info!(count = migrator.iter().count(), "running database migrations");
    migrator.run(pool).await?;
    info!("migrations completed");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::LogFormat;

    fn config(max: u32) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            database_url: "postgres://localhost/yatube".into(),
            jwt_secret: "secret".into(),
            cors_origins: vec![],
            page_size: 10,
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 86400,
            admin_usernames: vec![],
            db_max_connections: max,
            db_acquire_timeout_secs: 7,
            log_format: LogFormat::Json,
        }
    }

    #[test]
    fn pool_follows_configured_limits() {
        let options = pool_options(&config(8));
        assert_eq!(options.get_max_connections(), 8);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(7));
    }

    #[test]
    fn single_connection_pool_keeps_min_within_max() {
        let options = pool_options(&config(1));
        assert_eq!(options.get_min_connections(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn migrations_are_idempotent() {
        let Some(db) = test_support::TestDatabase::start().await else {
            return;
        };
        run_migrations(&db.pool).await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = 'public' \
               AND table_name IN ('users', 'groups', 'posts', 'comments', 'follows')",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert_eq!(tables, 5);
    }
}
