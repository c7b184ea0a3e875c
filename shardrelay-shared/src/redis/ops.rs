/// Cluster command seam shared by every component
///
/// The publisher, key/value façade and inspector never touch the driver
/// directly. They talk to an `Arc<dyn ClusterOps>`, which in production is
/// [`RedisCluster`](super::client::RedisCluster) and in tests is
/// [`MockCluster`](super::mock::MockCluster).
///
/// # Error classes
///
/// Driver errors are folded into three classes:
///
/// | Class        | Examples                                        | Retryable |
/// |--------------|-------------------------------------------------|-----------|
/// | `Connection` | IO error, refused, dropped, cluster down        | yes       |
/// | `Timeout`    | command exceeded the configured timeout         | yes       |
/// | `Command`    | WRONGTYPE, parse failure, anything else         | no        |

use async_trait::async_trait;
use redis::{ErrorKind, RedisError};
use thiserror::Error;

/// Classified cluster operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// The node or cluster could not be reached
    #[error("{0}")]
    Connection(String),

    /// The command did not complete within the command timeout
    #[error("{0}")]
    Timeout(String),

    /// The command reached the cluster and failed there
    #[error("{0}")]
    Command(String),
}

impl ClusterError {
    /// Whether this error belongs to the transient connection-failure class
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ClusterError::Connection(_) | ClusterError::Timeout(_))
    }
}

impl From<RedisError> for ClusterError {
    fn from(err: RedisError) -> Self {
        if err.is_timeout() {
            return ClusterError::Timeout(err.to_string());
        }

        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            return ClusterError::Connection(err.to_string());
        }

        match err.kind() {
            ErrorKind::ClusterConnectionNotFound
            | ErrorKind::ClusterDown
            | ErrorKind::MasterDown => ClusterError::Connection(err.to_string()),
            _ => ClusterError::Command(err.to_string()),
        }
    }
}

/// Result alias for cluster operations
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Operations the relay needs from a Redis cluster
///
/// Implementations must be safe for concurrent use; callers hold the handle
/// behind an `Arc` and never lock around it.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Publishes `message` on `channel`, returning the receiver count
    async fn publish(&self, channel: &str, message: &str) -> ClusterResult<i64>;

    /// Stores a string value
    async fn set(&self, key: &str, value: &str) -> ClusterResult<()>;

    /// Reads a string value, `None` when the key does not exist
    async fn get(&self, key: &str) -> ClusterResult<Option<String>>;

    /// Returns the raw `INFO <section>` text of the status node
    async fn info(&self, section: &str) -> ClusterResult<String>;

    /// Health check, `true` on PONG
    async fn ping(&self) -> ClusterResult<bool>;

    /// Sends one slot-routed read per shard so the driver revalidates its
    /// slot map; a moved slot answers `MOVED` and triggers a rebuild
    async fn refresh_topology(&self) -> ClusterResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_connection_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ClusterError::from(RedisError::from(io));
        assert!(matches!(err, ClusterError::Connection(_)));
        assert!(err.is_connection_failure());
    }

    #[test]
    fn test_timeout_is_connection_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = ClusterError::from(RedisError::from(io));
        assert!(matches!(err, ClusterError::Timeout(_)));
        assert!(err.is_connection_failure());
    }

    #[test]
    fn test_response_error_is_command_error() {
        let err = ClusterError::from(RedisError::from((
            ErrorKind::TypeError,
            "WRONGTYPE Operation against a key holding the wrong kind of value",
        )));
        assert!(matches!(err, ClusterError::Command(_)));
        assert!(!err.is_connection_failure());
    }

    #[test]
    fn test_cluster_down_is_connection_failure() {
        let err = ClusterError::from(RedisError::from((ErrorKind::ClusterDown, "CLUSTERDOWN")));
        assert!(err.is_connection_failure());
    }
}
