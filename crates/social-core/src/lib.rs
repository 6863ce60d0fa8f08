//! # Social Core
//!
//! The domain layer of the Mini Social backend: posts, comments and the users
//! who write them, the rules that validate them, and the `FeedService` use
//! cases both HTTP surfaces are built on.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod validation;

pub use error::DomainError;
pub use service::FeedService;
