use std::sync::Arc;

use clap::Parser;
use shici::config::{Cli, Config, default_config_dir, default_config_path};
use shici::content::ContentTree;
use shici::db::Database;
use shici::favorites::{Favorites, InFlight, LibsqlFavoriteStore};
use shici::{AppState, build_router};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // With --config, data (the database) lives next to the config file.
    // Otherwise both live under ~/.shici/
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("shici.svc starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });
    let db = Arc::new(Database::new(&cfg, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup database");
        std::process::exit(1);
    }));
    let content = Arc::new(ContentTree::load(cfg.app.get_content_dir()).unwrap_or_else(|e| {
        tracing::error!(error = %format!("{:#}", e), "failed to load content");
        std::process::exit(1);
    }));

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let cancellation_token = CancellationToken::new();

    // Push local writes to the hosted database between the replica's own syncs
    let sync_db = db.clone();
    let sync_token = cancellation_token.clone();
    let sync_interval = std::time::Duration::from_secs(cfg.app.sync_interval_seconds.max(1));
    let sync_task = tokio::spawn(async move {
        if !sync_db.syncs_remotely() {
            return;
        }
        let mut interval = tokio::time::interval(sync_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = sync_db.sync().await {
                        tracing::warn!("failed to sync database: {}", e);
                    }
                }
                _ = sync_token.cancelled() => {
                    tracing::info!("database sync task shutting down");
                    break;
                }
            }
        }
    });

    let app = build_router(AppState {
        favorites: Favorites::new(Arc::new(LibsqlFavoriteStore::new(db.clone()))),
        content,
        in_flight: Arc::new(InFlight::default()),
        auth: cfg.auth.clone(),
        base_url: cfg.app.base_url.clone(),
        shutdown: cancellation_token.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("shici.svc running on {}", &address);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server stopped unexpectedly");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
        }
    }

    cancellation_token.cancel();

    if let Err(e) = sync_task.await {
        tracing::warn!("database sync task ended abnormally: {}", e);
    }
    if let Err(e) = db.sync().await {
        tracing::warn!("final database sync failed: {}", e);
    }
    tracing::info!("shici.svc going off, graceful shutdown complete");
}
