//! # ShardRelay Shared Library
//!
//! This crate contains the Redis cluster integration and business logic used
//! by the ShardRelay API server.
//!
//! ## Module Organization
//!
//! - `redis`: Cluster client, command seam and in-memory mock
//! - `routing`: Shard target to hashtag channel table
//! - `publisher`: Shard-pinned publish with bounded retry
//! - `kv`: Key/value façade
//! - `inspector`: Cluster status snapshot
//! - `listener`: Background subscription to `users:unregister`
//! - `events`: Relay events and observability sinks

pub mod events;
pub mod inspector;
pub mod kv;
pub mod listener;
pub mod publisher;
pub mod redis;
pub mod routing;

/// Current version of the ShardRelay shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
