use mimalloc::MiMalloc;
use smart_brain::api::ClarifaiClient;
use smart_brain::db::{self, PgAccountStore};
use smart_brain::service::{CredentialHasher, ErrorLog};
use smart_brain::{BrainState, Config, brain_router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        port = cfg.port,
        database_ssl = cfg.database_ssl,
        clarifai_api_url = %cfg.clarifai_api_url,
        error_log = %cfg.error_log_path.display(),
        loglevel = %cfg.loglevel,
        request_timeout = ?cfg.request_timeout(),
        backend_timeout = ?cfg.backend_timeout()
    );
    if cfg.clarifai_api_key.is_empty() {
        warn!("CLARIFAI_API_KEY is empty; /clarifai requests will be rejected upstream");
    }

    let hasher = CredentialHasher::new();
    let pool = db::connect(&cfg).await?;
    let store = PgAccountStore::new(pool, hasher.clone());
    if cfg.init_schema {
        store.init_schema().await?;
        info!("database schema ready");
    }
    let detector = ClarifaiClient::new(&cfg)?;

    let state = BrainState::new(
        Arc::new(store),
        Arc::new(detector),
        hasher,
        ErrorLog::new(cfg.error_log_path.clone()),
    )
    .with_backend_timeout(cfg.backend_timeout());
    let app = brain_router(state, cfg.request_timeout());

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
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
    info!("shutdown signal received");
}
