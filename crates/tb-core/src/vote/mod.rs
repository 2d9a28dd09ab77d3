//! Vote module
//!
//! Vote state reconciliation and counter arithmetic.

pub mod counters;
pub mod model;
pub mod reconciler;

pub use counters::VoteCounters;
pub use model::{NewVote, VoteDelta, VoteKind, VoteRecord, VoteState};
pub use reconciler::{reconcile, Reconciliation, VoteWrite};
