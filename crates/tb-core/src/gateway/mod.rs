//! Gateway module
//!
//! Interfaces to the backing store and auth provider, plus an in-memory
//! implementation of both.

pub mod auth;
pub mod data;
pub mod memory;
pub mod repository;

pub use auth::{AuthEvent, AuthGateway, AuthSession, AuthUser};
pub use data::{
    from_record, from_records, to_record, ChangeEvent, ChangeKind, DataGateway, Filter, OrderBy,
    Query, Record, Subscription, SubscriptionId, Table,
};
pub use memory::{Account, MemoryBackend, StoreState};
pub use repository::ForumRepository;
