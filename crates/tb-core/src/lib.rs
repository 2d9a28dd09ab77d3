//! tb-core - Core library for threadboard
//!
//! This crate provides the forum's business logic: reply tree reconstruction,
//! vote reconciliation, validation, the gateway interfaces to the backing
//! store and auth provider (with an in-memory implementation), the session
//! context and the views that tie them together.

pub mod error;
pub mod types;
pub mod config;
pub mod comment;
pub mod post;
pub mod vote;
pub mod gateway;
pub mod session;
pub mod view;

pub use error::{ForumError, Result};
pub use types::*;
