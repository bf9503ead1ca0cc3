use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use axelar_staking::{
    api::{self, AppState},
    db, QueryCache, Settings,
};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("Failed to initialize logger")?;

    // Load configuration
    let settings = Settings::new()
        .context("Failed to load configuration. Check config.yaml and AXELAR_STAKING__* variables")?;

    let defaults = settings
        .dashboard
        .default_range()
        .context("Invalid dashboard default date range")?;

    // One warehouse handle for the whole process; failing here is fatal
    let source = db::connect(&settings.warehouse)
        .await
        .context("Failed to connect to the staking warehouse")?;

    info!("Using {} warehouse", source.name());

    let state = AppState {
        cache: QueryCache::new(source),
        defaults,
        token_symbol: settings.dashboard.token_symbol.clone(),
    };

    let cancellation_token = CancellationToken::new();

    let server_token = cancellation_token.child_token();
    let listen_addr = settings.server.listen_addr.clone();
    let mut server_handle = tokio::spawn(async move {
        api::serve(api::router(state), &listen_addr, server_token).await
    });

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Staking dashboard running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
            result = &mut server_handle => {
                return match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        error!("Dashboard API exited: {:#}", e);
                        Err(e)
                    },
                    Err(e) => Err(anyhow::anyhow!("Dashboard API task panicked: {}", e)),
                };
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            result = &mut server_handle => {
                return match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        error!("Dashboard API exited: {:#}", e);
                        Err(e)
                    },
                    Err(e) => Err(anyhow::anyhow!("Dashboard API task panicked: {}", e)),
                };
            },
        };
    }

    info!("Waiting for in-flight requests...");
    cancellation_token.cancel();

    match server_handle.await {
        Ok(Ok(())) => {},
        Ok(Err(e)) => error!("Dashboard API stopped with error: {:#}", e),
        Err(e) => error!("Dashboard API task panicked: {}", e),
    }

    // Dropping the last handle closes the warehouse connection
    info!("Shutdown complete");
    Ok(())
}
