mod api;
mod clock;
mod middleware;

use std::sync::Arc;

use barhop_places::PlacesClient;
use barhop_store::MemStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    clock::SystemClock,
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(barhop_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let seed = barhop_core::load_seed(config.seed_path.as_deref())?;
    let store = MemStore::seeded(&seed).await?;

    let places = match config.google_api_key.as_deref() {
        Some(key) => Some(Arc::new(
            PlacesClient::new(key, config.places_timeout_secs)?
                .with_retry(config.places_max_retries, config.places_retry_backoff_ms),
        )),
        None => {
            tracing::warn!("GOOGLE_API_KEY not set; places search and details are disabled");
            None
        }
    };

    let state = AppState {
        store,
        places,
        clock: Arc::new(SystemClock),
        config: Arc::clone(&config),
    };
    let app = build_app(state, RateLimitState::per_minute(config.rate_limit_per_minute));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "barhop server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
