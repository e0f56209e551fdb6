//! Cinereview HTTP server.
//!
//! Uses PostgreSQL when built with the `postgres` feature and `DATABASE_URL`
//! is set, otherwise keeps everything in memory.

use cinereview_auth::UserRepository;
use cinereview_auth::mocks::MemoryUserRepository;
use cinereview_core::environment::SharedClock;
use cinereview_core::SystemClock;
use cinereview_reviews::mocks::MemoryReviewStore;
use cinereview_reviews::{CatalogRepository, RatingAggregator, ReviewRepository};
use cinereview_server::{AppState, Config, build_router, seed};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cinereview server");
    if config.auth.uses_development_secret() {
        warn!("AUTH_TOKEN_SECRET is not set; using the development signing key");
    }

    let clock: SharedClock = Arc::new(SystemClock);

    #[cfg(feature = "postgres")]
    if let Some(url) = config.database.url.clone() {
        use cinereview_auth::stores::postgres::PostgresUserRepository;
        use cinereview_reviews::stores::PostgresReviewStore;

        info!("Connecting to database...");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database connected and migrated");

        return serve(
            config,
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresReviewStore::new(pool)),
            clock,
        )
        .await;
    }

    #[cfg(not(feature = "postgres"))]
    if config.database.url.is_some() {
        warn!("DATABASE_URL is set but the server was built without the postgres feature");
    }

    info!("Using in-memory storage");
    serve(
        config,
        Arc::new(MemoryUserRepository::new()),
        Arc::new(MemoryReviewStore::new()),
        clock,
    )
    .await
}

async fn serve<U, S>(
    config: Config,
    users: Arc<U>,
    store: Arc<S>,
    clock: SharedClock,
) -> anyhow::Result<()>
where
    U: UserRepository,
    S: ReviewRepository + CatalogRepository,
{
    let state = AppState::new(users, Arc::clone(&store), &config.auth_config(), clock)?;

    if let Some(path) = &config.catalog_seed_path {
        let records = seed::load(path).await?;
        let report = state.catalog.ingest(records).await?;
        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            rejected = report.rejected,
            "Catalog seed ingested"
        );
    }

    let reconciled = RatingAggregator::new(store).reconcile_all().await?;
    info!(movies = reconciled, "Movie ratings reconciled");

    let app = build_router(state);

    let addr = config.bind_address();
    info!(address = %addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let shutdown = Arc::new(Notify::new());
    let trigger = Arc::clone(&shutdown);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            trigger.notify_one();
        })
        .into_future();

    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout);
    tokio::select! {
        result = server => result?,
        () = async {
            shutdown.notified().await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            warn!(timeout_secs = config.server.shutdown_timeout, "Graceful shutdown timed out");
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
