/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `publish`: Shard-pinned deregistration events
/// - `data`: Key/value reads and writes
/// - `cluster`: Cluster status snapshot

pub mod cluster;
pub mod data;
pub mod health;
pub mod publish;
