//! Server configuration from command-line flags and environment variables.

use crate::api::TokenBinding;
use crate::task::services::DEFAULT_MAX_COMMIT_ATTEMPTS;
use clap::Parser;
use std::net::SocketAddr;

/// Atelier server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "atelier-server")]
#[command(about = "Task marketplace lifecycle and arbitration server", long_about = None)]
#[command(version)]
pub struct ServerConfig {
    /// Listen address
    #[arg(short, long, env = "ATELIER_LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// `PostgreSQL` connection URL; the in-memory store is used when absent
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(
        long,
        env = "ATELIER_POOL_SIZE",
        default_value_t = 8,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub pool_size: u32,

    /// Commit attempts before a contended operation gives up
    #[arg(
        long,
        env = "ATELIER_MAX_COMMIT_ATTEMPTS",
        default_value_t = DEFAULT_MAX_COMMIT_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_commit_attempts: u32,

    /// Log level or filter directive
    #[arg(long, env = "ATELIER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "ATELIER_LOG_JSON")]
    pub log_json: bool,

    /// Bearer token binding as `TOKEN=USER_UUID`; repeatable
    #[arg(long = "token", env = "ATELIER_TOKENS", value_delimiter = ',')]
    pub tokens: Vec<TokenBinding>,
}
