mod api;
mod middleware;

use std::sync::Arc;

use dealwatch_pipeline::{restore_backups, BackupWriter, DealStore, Orchestrator};
use dealwatch_scraper::{FetchPolicy, PageFetcher};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = dealwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting dealwatch-server");

    let store = Arc::new(DealStore::new());
    let restored = restore_backups(&config.backup_dir, &store);
    tracing::info!(restored, backup_dir = %config.backup_dir.display(), "deal store ready");

    let fetcher = PageFetcher::new(FetchPolicy::from_config(&config))?;
    let orchestrator = Orchestrator::new(fetcher, store)
        .with_backup(BackupWriter::new(&config.backup_dir))
        .with_detail_pages(config.scraper_detail_pages);
    let app = build_app(AppState { orchestrator });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
