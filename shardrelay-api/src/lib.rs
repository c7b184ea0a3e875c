//! # ShardRelay API Server Library
//!
//! HTTP surface for the deregistration relay: shard-pinned publishing,
//! a key/value façade and a cluster status snapshot.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
