mod bootstrap;
mod health;
mod routes;
mod sessions;

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::Result;
use haggle_core::config::{AppConfig, LoadOptions};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    use haggle_core::config::LogFormat::*;

    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

async fn run() -> Result<()> {
    // Config first so logging honours the configured level and format.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    let router = routes::router(app.negotiation.clone()).merge(health::router(
        health::HealthState::new(app.registry.clone(), app.classifier_provider),
    ));

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        classifier = app.classifier_provider,
        "haggle-server listening"
    );

    let drain = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!(
            event_name = "system.server.stopping",
            correlation_id = "shutdown",
            "shutdown signal received, draining in-flight requests"
        );
    });

    let mut serve = std::pin::pin!(server.into_future());
    tokio::select! {
        result = &mut serve => result?,
        _ = async {
            let _ = tokio::signal::ctrl_c().await;
            tokio::time::sleep(drain).await;
        } => {
            tracing::warn!(
                event_name = "system.server.drain_timeout",
                correlation_id = "shutdown",
                drain_secs = drain.as_secs(),
                "graceful shutdown budget exhausted"
            );
        }
    }

    tracing::info!(event_name = "system.server.stopped", correlation_id = "shutdown", "haggle-server stopped");
    Ok(())
}
