use std::net::SocketAddr;
use std::time::Duration;

use rooffax_audit::{config::Config, open_store, routes, store::AuditStore, AppState};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let store = open_store(&config).await?;
    let app_state = AppState::new(config.clone(), store.clone());

    if let Some(hours) = config.sweep_interval_hours.filter(|h| *h > 0) {
        let sweeper = app_state.retention_sweeper.clone();
        info!(hours, "in-process audit retention sweep enabled");
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(hours * 3600));
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = sweeper.sweep_default().await {
                    error!(error = %e, "audit retention sweep failed");
                }
            }
        });
    }

    let app = routes::router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
