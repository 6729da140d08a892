use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use larder_api::app::{build_app, services};
use larder_infra::Config;
use larder_infra::ai::ForecastRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    larder_observability::init();

    let config = Config::from_env().context("invalid configuration")?;
    let services = Arc::new(services::build_services(&config).await?);

    let runner = ForecastRunner::new(config.forecast_daily_at)
        .spawn(services.reconciler.clone(), tokio::runtime::Handle::current())
        .context("failed to spawn forecast runner")?;

    let app = build_app(services);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tokio::task::spawn_blocking(move || runner.shutdown()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
