//! # Social Shared
//!
//! Wire types shared by the API server and the feed client.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MessageResponse};
