//! finstack entry point
//!
//! Starts both services from one binary: the Core API on its own port and
//! the gateway in front of it. Both drain on Ctrl-C.

use anyhow::Context;
use tokio::sync::watch;

use finstack::config::AppConfig;
use finstack::db::Database;
use finstack::logging::init_logging;
use finstack::{api, gateway};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env)
        .with_context(|| format!("failed to load config for env '{}'", env))?;

    let _guard = init_logging(&config);
    tracing::info!(env, "Starting finstack");

    let db = Database::connect(&config.postgres_url, config.db_max_connections)
        .await
        .context("failed to connect to Postgres")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let api_shutdown = {
        let mut rx = shutdown_rx.clone();
        async move {
            let _ = rx.changed().await;
        }
    };
    let gateway_shutdown = {
        let mut rx = shutdown_rx;
        async move {
            let _ = rx.changed().await;
        }
    };

    let api_config = config.api.clone();
    let api_task = tokio::spawn(async move { api::run_server(&api_config, db, api_shutdown).await });

    let gateway_config = config.gateway.clone();
    let gateway_task =
        tokio::spawn(async move { gateway::run_server(&gateway_config, gateway_shutdown).await });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received, draining");
    let _ = shutdown_tx.send(true);

    api_task.await.context("Core API task panicked")??;
    gateway_task.await.context("Gateway task panicked")??;

    tracing::info!("All services stopped");
    Ok(())
}
