/// Cluster status inspection
///
/// Reads `INFO cluster`, `INFO replication` and `INFO server` from the status
/// node and projects a handful of fields into a flat [`ClusterStatusSnapshot`].
/// Nothing is cached; every call queries the node again. If any of the three
/// queries fails the whole inspection fails.
///
/// # Response shape
///
/// ```json
/// {
///   "nodeId": "e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca",
///   "clusterState": "ok",
///   "clusterSlotsAssigned": "16384",
///   "clusterSlotsOk": "16384",
///   "role": "slave",
///   "connectedSlaves": "0",
///   "redis_version": "7.2.4",
///   "tcp_port": "7003",
///   "uptime_in_seconds": "86400",
///   "masterHost": "10.0.0.1",
///   "masterPort": "7000",
///   "masterLinkStatus": "up"
/// }
/// ```
///
/// The three `master*` keys appear only when the node is a replica.

use crate::redis::ops::{ClusterError, ClusterOps};
use redis::InfoDict;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Inspection errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    /// One of the INFO queries failed
    #[error("{0}")]
    Query(#[from] ClusterError),
}

/// Flat view of one node's cluster, replication and server state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatusSnapshot {
    #[serde(rename = "nodeId")]
    pub node_id: Option<String>,

    #[serde(rename = "clusterState")]
    pub cluster_state: Option<String>,

    #[serde(rename = "clusterSlotsAssigned")]
    pub cluster_slots_assigned: Option<String>,

    #[serde(rename = "clusterSlotsOk")]
    pub cluster_slots_ok: Option<String>,

    pub role: Option<String>,

    #[serde(rename = "connectedSlaves")]
    pub connected_slaves: Option<String>,

    pub redis_version: Option<String>,

    pub tcp_port: Option<String>,

    pub uptime_in_seconds: Option<String>,

    #[serde(rename = "masterHost", skip_serializing_if = "Option::is_none")]
    pub master_host: Option<String>,

    #[serde(rename = "masterPort", skip_serializing_if = "Option::is_none")]
    pub master_port: Option<String>,

    #[serde(rename = "masterLinkStatus", skip_serializing_if = "Option::is_none")]
    pub master_link_status: Option<String>,
}

impl ClusterStatusSnapshot {
    /// Projects parsed INFO sections into a snapshot
    pub fn from_sections(cluster: &InfoDict, replication: &InfoDict, server: &InfoDict) -> Self {
        let mut snapshot = Self {
            node_id: cluster.get("cluster_my_id"),
            cluster_state: cluster.get("cluster_state"),
            cluster_slots_assigned: cluster.get("cluster_slots_assigned"),
            cluster_slots_ok: cluster.get("cluster_slots_ok"),
            role: replication.get("role"),
            connected_slaves: replication.get("connected_slaves"),
            redis_version: server.get("redis_version"),
            tcp_port: server.get("tcp_port"),
            uptime_in_seconds: server.get("uptime_in_seconds"),
            ..Self::default()
        };

        if snapshot.is_replica() {
            snapshot.master_host = replication.get("master_host");
            snapshot.master_port = replication.get("master_port");
            snapshot.master_link_status = replication.get("master_link_status");
        }

        snapshot
    }

    /// Whether the queried node is a replica
    pub fn is_replica(&self) -> bool {
        matches!(self.role.as_deref(), Some("slave") | Some("replica"))
    }
}

/// Read-only cluster inspector
#[derive(Clone)]
pub struct ClusterInspector {
    cluster: Arc<dyn ClusterOps>,
}

impl ClusterInspector {
    pub fn new(cluster: Arc<dyn ClusterOps>) -> Self {
        Self { cluster }
    }

    /// Queries the status node and builds a fresh snapshot
    pub async fn inspect(&self) -> Result<ClusterStatusSnapshot, InspectError> {
        let cluster = self.section("cluster").await?;
        let replication = self.section("replication").await?;
        let server = self.section("server").await?;

        Ok(ClusterStatusSnapshot::from_sections(&cluster, &replication, &server))
    }

    async fn section(&self, name: &str) -> Result<InfoDict, InspectError> {
        let raw = self.cluster.info(name).await?;
        tracing::debug!(section = name, info = %raw.trim_end(), "Redis INFO section");
        Ok(InfoDict::new(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redis::mock::MockCluster;

    const CLUSTER_SECTION: &str = "# Cluster\r\n\
cluster_state:ok\r\n\
cluster_slots_assigned:16384\r\n\
cluster_slots_ok:16384\r\n\
cluster_my_id:e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca\r\n";

    const SERVER_SECTION: &str = "# Server\r\n\
redis_version:7.2.4\r\n\
tcp_port:7000\r\n\
uptime_in_seconds:86400\r\n";

    const MASTER_REPLICATION: &str = "# Replication\r\n\
role:master\r\n\
connected_slaves:1\r\n\
slave0:ip=10.0.0.4,port=7003,state=online,offset=1204,lag=0\r\n";

    const REPLICA_REPLICATION: &str = "# Replication\r\n\
role:slave\r\n\
master_host:10.0.0.1\r\n\
master_port:7000\r\n\
master_link_status:up\r\n\
connected_slaves:0\r\n";

    fn inspector(replication: &str) -> ClusterInspector {
        let cluster = MockCluster::new()
            .with_info("cluster", CLUSTER_SECTION)
            .with_info("replication", replication)
            .with_info("server", SERVER_SECTION);
        ClusterInspector::new(Arc::new(cluster))
    }

    #[tokio::test]
    async fn test_master_snapshot_omits_master_fields() {
        let snapshot = inspector(MASTER_REPLICATION).inspect().await.unwrap();

        assert_eq!(snapshot.role.as_deref(), Some("master"));
        assert_eq!(snapshot.cluster_state.as_deref(), Some("ok"));
        assert_eq!(snapshot.connected_slaves.as_deref(), Some("1"));
        assert_eq!(snapshot.redis_version.as_deref(), Some("7.2.4"));
        assert!(!snapshot.is_replica());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("masterHost").is_none());
        assert!(json.get("masterPort").is_none());
        assert!(json.get("masterLinkStatus").is_none());
        assert_eq!(json["nodeId"], "e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca");
        assert_eq!(json["clusterSlotsOk"], "16384");
        assert_eq!(json["uptime_in_seconds"], "86400");
    }

    #[tokio::test]
    async fn test_replica_snapshot_includes_master_fields() {
        let snapshot = inspector(REPLICA_REPLICATION).inspect().await.unwrap();

        assert!(snapshot.is_replica());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["role"], "slave");
        assert_eq!(json["masterHost"], "10.0.0.1");
        assert_eq!(json["masterPort"], "7000");
        assert_eq!(json["masterLinkStatus"], "up");
    }

    #[tokio::test]
    async fn test_missing_fields_serialize_as_null() {
        let cluster = MockCluster::new().with_info("replication", "role:master\r\n");
        let snapshot = ClusterInspector::new(Arc::new(cluster)).inspect().await.unwrap();

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["clusterState"].is_null());
        assert!(json["redis_version"].is_null());
    }

    #[tokio::test]
    async fn test_any_failed_section_fails_inspection() {
        let cluster = MockCluster::new()
            .with_info("cluster", CLUSTER_SECTION)
            .with_info("replication", MASTER_REPLICATION);
        cluster.fail_info("server", ClusterError::Connection("broken pipe".into()));

        let err = ClusterInspector::new(Arc::new(cluster)).inspect().await.unwrap_err();
        assert_eq!(err.to_string(), "broken pipe");
    }
}
