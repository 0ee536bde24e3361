use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hangmatch::api::{create_router, AppState};
use hangmatch::config::Config;
use hangmatch::db::{Database, DatabaseBackend, LibSqlBackend};
use hangmatch::venues::VenueSearchProvider;

#[derive(Parser)]
#[command(name = "hangmatch")]
#[command(about = "Hangout matching service for time-bounded intent sessions")]
struct Args {
    /// Run an expiry sweep immediately at startup instead of waiting for the
    /// first interval tick
    #[arg(long)]
    sweep_on_start: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hangmatch=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));

    if config.venues.is_none() {
        tracing::warn!(
            "TAVILY_API_KEY is not set - matching runs will return no venue suggestions"
        );
    }
    let venues = Arc::new(VenueSearchProvider::new(config.venues.clone()));

    let state = AppState::new(config.clone(), db, venues);

    if args.sweep_on_start {
        let swept = state
            .db
            .deactivate_expired_sessions(chrono::Utc::now())
            .await?;
        tracing::info!(swept, "startup expiry sweep completed");
    }

    let cancel_token = CancellationToken::new();

    tracing::info!(
        "Starting session expiry sweeper... (interval={}s)",
        state.config.session.sweep_interval_secs
    );
    let sweeper_db = state.db.clone();
    let sweep_interval = state.config.session.sweep_interval_secs;
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Session expiry sweeper shutting down...");
                    break;
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(sweep_interval)) => {
                    match sweeper_db.deactivate_expired_sessions(chrono::Utc::now()).await {
                        Ok(0) => {}
                        Ok(swept) => tracing::info!(swept, "deactivated expired intent sessions"),
                        Err(e) => tracing::error!("Session expiry sweep error: {}", e),
                    }
                }
            }
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Hangmatch starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
