use better_now::{AppState, Config, EntryStore, FileStore, LoadOutcome, router};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let mut store = EntryStore::with_policy(FileStore::new(&config.data_dir), config.recovery);
    let (store, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = store.load();
        (store, outcome)
    })
    .await?;
    match outcome {
        LoadOutcome::Reset => warn!("stored entries could not be read, starting empty"),
        LoadOutcome::Recovered { kept, dropped } => {
            warn!(kept, dropped, "some stored entries were unreadable and dropped")
        }
        LoadOutcome::Missing | LoadOutcome::Loaded { .. } => {}
    }

    let app = router(AppState::new(store, config.seed_enabled));

    let addr = config.listen_addr();
    info!(data_dir = %config.data_dir.display(), "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
