//! Comment commands
//!
//! Each command opens the post's comment thread, performs one action and
//! closes the thread again.

use super::context::{confirm, fail, AppContext};
use super::GlobalArgs;
use crate::render;
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use tb_core::comment::{find_node, CommentValidator, SortOrder};
use tb_core::types::{CommentId, PostId};
use tb_core::view::{CommentsView, Confirmation, PostDetailView};

/// Comment subcommands
#[derive(Debug, Subcommand)]
pub enum CommentCommand {
    /// Show the comment thread of a post
    List {
        /// Post ID
        post_id: PostId,

        /// Order of top-level comments (newest or oldest)
        #[arg(long)]
        order: Option<SortOrder>,
    },

    /// Comment on a post
    Add {
        /// Post ID
        post_id: PostId,

        /// Comment text
        text: String,
    },

    /// Reply to a comment
    Reply {
        /// Post ID
        post_id: PostId,

        /// Comment being replied to
        comment_id: CommentId,

        /// Reply text
        text: String,
    },

    /// Change the text of one of your comments
    Edit {
        /// Post ID
        post_id: PostId,

        /// Comment ID
        comment_id: CommentId,

        /// New text
        text: String,
    },

    /// Delete one of your comments and its replies
    Delete {
        /// Post ID
        post_id: PostId,

        /// Comment ID
        comment_id: CommentId,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Execute a comment command
pub fn execute(cmd: CommentCommand, global: &GlobalArgs) -> Result<()> {
    let ctx = AppContext::load(global)?;
    match cmd {
        CommentCommand::List { post_id, order } => list_comments(&ctx, post_id, order),
        CommentCommand::Add { post_id, text } => {
            let mut thread = open_thread(&ctx, post_id, None)?;
            let comment = thread.add(&text).map_err(fail)?;
            thread.close().map_err(fail)?;
            println!("{} Added comment {}", "✓".green(), format!("[{}]", comment.id).yellow());
            Ok(())
        }
        CommentCommand::Reply {
            post_id,
            comment_id,
            text,
        } => {
            let mut thread = open_thread(&ctx, post_id, None)?;
            let comment = thread.reply(comment_id, &text).map_err(fail)?;
            thread.close().map_err(fail)?;
            println!(
                "{} Replied to {} with {}",
                "✓".green(),
                format!("[{}]", comment_id).yellow(),
                format!("[{}]", comment.id).yellow()
            );
            Ok(())
        }
        CommentCommand::Edit {
            post_id,
            comment_id,
            text,
        } => {
            let mut thread = open_thread(&ctx, post_id, None)?;
            thread.edit(comment_id, &text).map_err(fail)?;
            thread.close().map_err(fail)?;
            println!("{} Updated comment {}", "✓".green(), format!("[{}]", comment_id).yellow());
            Ok(())
        }
        CommentCommand::Delete {
            post_id,
            comment_id,
            yes,
        } => delete_comment(&ctx, post_id, comment_id, yes),
    }
}

/// Open the thread of an existing post
fn open_thread(
    ctx: &AppContext,
    post_id: PostId,
    order: Option<SortOrder>,
) -> Result<CommentsView> {
    let mut detail = PostDetailView::new(ctx.data(), ctx.session(), post_id);
    detail.load().map_err(fail)?;

    CommentsView::open(
        ctx.data(),
        ctx.session(),
        post_id,
        order.unwrap_or(ctx.config.comments.default_order),
        CommentValidator::with_max_length(ctx.config.comments.max_length),
    )
    .map_err(fail)
}

fn list_comments(ctx: &AppContext, post_id: PostId, order: Option<SortOrder>) -> Result<()> {
    let mut thread = open_thread(ctx, post_id, order)?;
    if thread.total() == 0 {
        println!("{}", "No comments yet.".dimmed());
    } else {
        println!("{}", render::comment_tree(thread.tree(), &ctx.config.ui.date_format));
    }
    thread.close().map_err(fail)?;
    Ok(())
}

fn delete_comment(ctx: &AppContext, post_id: PostId, comment_id: CommentId, yes: bool) -> Result<()> {
    let mut thread = open_thread(ctx, post_id, None)?;

    let confirmation = if thread.can_modify(comment_id) {
        let replies = find_node(thread.tree(), comment_id)
            .map(|node| node.len() - 1)
            .unwrap_or(0);
        let prompt = if replies > 0 {
            format!("Delete comment [{}] and its {} replies?", comment_id, replies)
        } else {
            format!("Delete comment [{}]?", comment_id)
        };
        confirm(&prompt, yes)?
    } else {
        Confirmation::Declined
    };

    let deleted = thread.delete(comment_id, confirmation).map_err(fail)?;
    thread.close().map_err(fail)?;
    if deleted {
        println!("{} Deleted comment {}", "✓".green(), format!("[{}]", comment_id).yellow());
    } else {
        println!("Delete cancelled.");
    }
    Ok(())
}
