//! # Social Infrastructure
//!
//! Concrete implementations of the ports defined in `social-core`.
//! This crate contains the database repositories, the in-memory fallback
//! store and the filesystem media store.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//!
//! Without `postgres` only the in-memory store is available.

pub mod database;
pub mod media;

pub use database::{DatabaseConfig, DatabaseConnections, InMemoryDatabase};
pub use media::LocalMediaStore;
