/// Redis cluster integration
///
/// This module provides the cluster handle every other component shares:
/// - Cluster-mode client built from a fixed [`ClientPolicy`]
/// - The [`ClusterOps`] seam used by the publisher, façade and inspector
/// - Status node failover across the seed list
/// - A periodic topology refresh task
/// - An in-memory [`MockCluster`] for tests
///
/// # Architecture
///
/// ```text
/// ┌──────────────┐
/// │  Publisher   │──PUBLISH {master1}users:unregister──┐
/// │  KV façade   │──SET / GET──────────────────────────┤
/// │  Inspector   │──INFO cluster|replication|server─┐  │
/// └──────────────┘                                  │  ▼
///                                   status node ◄───┘  cluster (slot routed)
/// ```

pub mod client;
pub mod mock;
pub mod ops;
pub mod status;
pub mod topology;

// Re-export common types for convenience
pub use client::{
    ClientPolicy, ClusterEndpoints, DisconnectedBehavior, ReadFrom, RedisClientError,
    RedisCluster,
};
pub use mock::MockCluster;
pub use ops::{ClusterError, ClusterOps, ClusterResult};
