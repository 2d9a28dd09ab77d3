//! Post module
//!
//! Post records, list filtering/sorting and validation.

pub mod listing;
pub mod model;
pub mod validator;

pub use listing::{count_comments, filter_and_sort, PostSort};
pub use model::{NewPost, Post, PostChanges};
pub use validator::PostValidator;
