/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `REDIS_CLUSTER_NODES`: Comma-separated `host:port` seed nodes (required)
/// - `REDIS_MAX_REDIRECTS`, `REDIS_COMMAND_TIMEOUT_SECS`,
///   `REDIS_CONNECTION_TIMEOUT_SECS`, `REDIS_TOPOLOGY_REFRESH_SECS`,
///   `REDIS_READ_FROM`: cluster client policy overrides
/// - `PUBLISH_RETRY_BACKOFF_MS`: Pause before a publish retry (default: 1000)
/// - `RUST_LOG`: Log level (default: debug for this workspace)
///
/// # Example
///
/// ```no_run
/// use shardrelay_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use shardrelay_shared::publisher::{RetryPolicy, DEFAULT_BACKOFF};
use shardrelay_shared::redis::{ClientPolicy, ClusterEndpoints};
use std::env;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Redis cluster configuration
    pub redis: RedisSettings,

    /// Publish retry configuration
    pub publish: PublishConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Redis cluster configuration
#[derive(Debug, Clone, Serialize)]
pub struct RedisSettings {
    /// Seed nodes
    pub endpoints: ClusterEndpoints,

    /// Client policy
    pub policy: ClientPolicy,
}

/// Publish configuration
#[derive(Debug, Clone, Serialize)]
pub struct PublishConfig {
    /// Pause before the single retry, in milliseconds
    pub retry_backoff_ms: u64,
}

impl PublishConfig {
    /// Retry policy for the publisher
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_backoff(Duration::from_millis(self.retry_backoff_ms))
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `REDIS_CLUSTER_NODES` is missing or empty
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let nodes = env::var("REDIS_CLUSTER_NODES")
            .map_err(|_| anyhow::anyhow!("REDIS_CLUSTER_NODES environment variable is required"))?;
        let endpoints = ClusterEndpoints::parse(&nodes)?;
        let policy = ClientPolicy::from_env()?;

        let retry_backoff_ms = env::var("PUBLISH_RETRY_BACKOFF_MS")
            .unwrap_or_else(|_| DEFAULT_BACKOFF.as_millis().to_string())
            .parse::<u64>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            redis: RedisSettings { endpoints, policy },
            publish: PublishConfig { retry_backoff_ms },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
