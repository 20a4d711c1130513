//! Runs the Atelier HTTP server.
//!
//! Usage:
//!
//! ```text
//! atelier_server --listen 127.0.0.1:8080 \
//!     --database-url postgres://atelier@localhost/atelier \
//!     --token client-token=6f1f9b9e-2b8e-4d3c-9a57-0c4b8f2d1a10
//! ```
//!
//! Without `--database-url` the server keeps state in memory, which is lost
//! on exit.

use atelier::{
    api::{ActorResolver, ApiState, StaticTokenResolver, create_router},
    config::ServerConfig,
    task::{
        adapters::{
            memory::InMemoryTaskRepository,
            postgres::{PostgresTaskRepository, TaskPgPool},
        },
        ports::TaskRepository,
        services::Marketplace,
    },
    telemetry::{TelemetryError, init_tracing},
};
use clap::Parser;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the server.
#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to build database pool: {0}")]
    Pool(#[source] PoolError),
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
    #[error("server terminated: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = ServerConfig::parse();
    run(&config).await.map_err(Into::into)
}

async fn run(config: &ServerConfig) -> Result<(), ServerError> {
    init_tracing(&config.log_level, config.log_json)?;

    let tokens = StaticTokenResolver::from_bindings(&config.tokens);
    if tokens.is_empty() {
        warn!("no bearer tokens configured; authenticated routes will answer 401");
    }
    let resolver: Arc<dyn ActorResolver> = Arc::new(tokens);

    if let Some(url) = config.database_url.as_deref() {
        let pool = build_pool(url, config.pool_size)?;
        info!(pool_size = config.pool_size, "using PostgreSQL task store");
        serve(config, Arc::new(PostgresTaskRepository::new(pool)), resolver).await
    } else {
        warn!("no database URL configured; using the in-memory task store");
        serve(config, Arc::new(InMemoryTaskRepository::new()), resolver).await
    }
}

fn build_pool(url: &str, pool_size: u32) -> Result<TaskPgPool, ServerError> {
    Pool::builder()
        .max_size(pool_size)
        .build(ConnectionManager::<PgConnection>::new(url))
        .map_err(ServerError::Pool)
}

async fn serve<R>(
    config: &ServerConfig,
    repository: Arc<R>,
    resolver: Arc<dyn ActorResolver>,
) -> Result<(), ServerError>
where
    R: TaskRepository + 'static,
{
    let marketplace = Marketplace::with_max_commit_attempts(
        repository,
        Arc::new(DefaultClock),
        config.max_commit_attempts,
    );
    let app = create_router(ApiState::new(marketplace, resolver));

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(ServerError::Bind)?;
    info!(addr = %config.listen, "atelier listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("atelier shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received terminate signal, shutting down"),
    }
}
