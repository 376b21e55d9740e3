use anyhow::Context;
use tokio::signal;

use upi_relay::{AppState, Config, create_router, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;
    let addr = config.server.addr().context("invalid HOST/PORT")?;

    if config.has_credentials() {
        tracing::info!(
            mode = config.gateway.mode.as_str(),
            base_url = config.gateway.base_url(),
            timeout_secs = config.gateway.timeout.as_secs(),
            "Payment gateway configured"
        );
    } else {
        tracing::warn!(
            "CASHFREE_APP_ID / CASHFREE_SECRET_KEY not set: running unconfigured, \
             payment and webhook endpoints will fail"
        );
    }

    let app_state = AppState::new(config).context("failed to build gateway client")?;
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!(%addr, "service starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
