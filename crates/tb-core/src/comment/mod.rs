//! Comment module
//!
//! Comment records, reply tree reconstruction and validation.

pub mod builder;
pub mod model;
pub mod tree;
pub mod validator;

pub use builder::CommentBuilder;
pub use model::{Comment, NewComment, SortOrder};
pub use tree::{find_node, forest_len, CommentNode, CommentTreeBuilder};
pub use validator::CommentValidator;
