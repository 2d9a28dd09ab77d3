//! tb-storage - Storage library for threadboard
//!
//! This crate provides a file-backed implementation of the data and auth
//! gateways.

mod schema;
mod store;

pub use schema::{StoreFile, StoreMigrator, CURRENT_SCHEMA_VERSION};
pub use store::FileSystemBackend;
