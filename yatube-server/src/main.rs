mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use std::sync::Arc;

use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing::info;

use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::mail::LogMailer;
use presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use server::{Services, build_cors};

// Unit tests run the handlers against the in-memory store instead.
#[cfg(not(test))]
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(config.log_format);

    let pool = create_pool(&config)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let services = Services::postgres(pool, &config, Arc::new(LogMailer));
    let config_data = config.clone();

    info!(host = %config.host, port = config.port, "HTTP server starting");

    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(build_cors(&config_data))
            .configure(move |cfg| services.configure(cfg))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
