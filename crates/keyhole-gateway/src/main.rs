use clap::Parser;
use keyhole_core::Shortener;
use keyhole_gateway::cli::{Cli, StorageBackendArg};
use keyhole_gateway::{telemetry, App, AppState};
use keyhole_generator::RandomGenerator;
use keyhole_shortener::{MappingService, Sweeper};
use keyhole_storage::{InMemoryRepository, RedbRepository, Repository};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse();
    telemetry::init(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        retention_secs = config.retention_secs,
        "starting keyhole"
    );

    match config.storage {
        StorageBackendArg::InMemory => serve(config, InMemoryRepository::new()).await,
        StorageBackendArg::Redb => {
            let repository = RedbRepository::open(&config.db_path)?;
            info!(path = %config.db_path.display(), "opened redb store");
            serve(config, repository).await
        }
    }
}

async fn serve<R: Repository>(config: Cli, repository: R) -> anyhow::Result<()> {
    info!(records = repository.len().await?, "url store ready");

    let service = MappingService::new(repository, RandomGenerator::new(), config.policy())?;
    let shortener: Arc<dyn Shortener> = Arc::new(service);

    let (stop_sweeper, sweeper_stopped) = oneshot::channel::<()>();
    let sweeper = config.retention().map(|_| {
        Sweeper::new(Arc::clone(&shortener), config.sweep_interval()).spawn(async move {
            let _ = sweeper_stopped.await;
        })
    });

    let state = AppState::new(shortener, config.base_url.clone());
    let app = App::router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = stop_sweeper.send(());
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            error!(error = %e, "expiry sweeper task failed");
        }
    }

    info!("keyhole stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
