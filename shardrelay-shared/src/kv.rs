/// Key/value façade over the cluster's string store
///
/// Thin pass-through: no caching, no TTLs, strings only. A missing key is a
/// normal `Ok(None)`, not an error. Connection failures are reported as
/// [`KvError::Unavailable`] so callers can tell them apart from other
/// failures; they are not retried.

use crate::redis::ops::{ClusterError, ClusterOps};
use std::sync::Arc;
use thiserror::Error;

/// Key/value errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    /// Key was empty
    #[error("key must not be empty")]
    EmptyKey,

    /// Cluster unreachable or command timed out
    #[error("{0}")]
    Unavailable(String),

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

impl From<ClusterError> for KvError {
    fn from(err: ClusterError) -> Self {
        if err.is_connection_failure() {
            KvError::Unavailable(err.to_string())
        } else {
            KvError::Failed(err.to_string())
        }
    }
}

/// String get/set against the cluster
#[derive(Clone)]
pub struct KeyValueStore {
    cluster: Arc<dyn ClusterOps>,
}

impl KeyValueStore {
    pub fn new(cluster: Arc<dyn ClusterOps>) -> Self {
        Self { cluster }
    }

    /// Stores `value` under `key`
    pub async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        if key.is_empty() {
            return Err(KvError::EmptyKey);
        }

        self.cluster.set(key, value).await?;
        tracing::info!(key, "Successfully saved data");
        Ok(())
    }

    /// Reads the value under `key`, `None` if absent
    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        if key.is_empty() {
            return Err(KvError::EmptyKey);
        }

        let value = self.cluster.get(key).await?;
        tracing::debug!(key, found = value.is_some(), "Fetched data");
        Ok(value)
    }
}
