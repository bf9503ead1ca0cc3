use anyhow::Context;
use axum::Router;
use log::info;
use tokio_util::sync::CancellationToken;

/// Serve `app` on `listen_addr` until the token is cancelled.
pub async fn serve(
    app: Router,
    listen_addr: &str,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;

    info!("Dashboard API listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancellation_token.cancelled().await })
        .await
        .context("Dashboard API server failed")?;

    info!("Dashboard API stopped");
    Ok(())
}
