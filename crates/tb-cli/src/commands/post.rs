//! Post commands
//!
//! List, read, write and vote on posts.

use super::context::{confirm, fail, AppContext};
use super::GlobalArgs;
use crate::render;
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use tb_core::comment::{CommentValidator, SortOrder};
use tb_core::post::{Post, PostSort, PostValidator};
use tb_core::types::PostId;
use tb_core::view::{CommentsView, Confirmation, PostDetailView, PostEditor, PostListView};
use tb_core::vote::{VoteKind, VoteState};

/// Post subcommands
#[derive(Debug, Subcommand)]
pub enum PostCommand {
    /// List posts
    List {
        /// Only show posts whose title contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order (created_at_desc, upvotes_desc, title_asc, comments_desc, ...)
        #[arg(long)]
        sort: Option<PostSort>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a post with its comments
    Show {
        /// Post ID
        id: PostId,

        /// Order of top-level comments (newest or oldest)
        #[arg(long)]
        order: Option<SortOrder>,
    },

    /// Publish a new post
    Create {
        /// Post title (prompted when omitted)
        #[arg(short, long)]
        title: Option<String>,

        /// Post body (prompted when omitted)
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Edit one of your posts
    Edit {
        /// Post ID
        id: PostId,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New body
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete one of your posts and everything under it
    Delete {
        /// Post ID
        id: PostId,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Vote on a post; repeating a vote withdraws it
    Vote {
        /// Post ID
        id: PostId,

        /// Direction: up or down
        direction: VoteKind,
    },
}

/// Execute a post command
pub fn execute(cmd: PostCommand, global: &GlobalArgs) -> Result<()> {
    let ctx = AppContext::load(global)?;
    match cmd {
        PostCommand::List { search, sort, json } => list_posts(&ctx, search, sort, json),
        PostCommand::Show { id, order } => show_post(&ctx, id, order),
        PostCommand::Create { title, description } => create_post(&ctx, title, description),
        PostCommand::Edit {
            id,
            title,
            description,
        } => edit_post(&ctx, id, title, description),
        PostCommand::Delete { id, yes } => delete_post(&ctx, id, yes),
        PostCommand::Vote { id, direction } => vote_post(&ctx, id, direction),
    }
}

#[derive(Serialize)]
struct PostRow<'a> {
    #[serde(flatten)]
    post: &'a Post,
    comments: usize,
}

fn list_posts(
    ctx: &AppContext,
    search: Option<String>,
    sort: Option<PostSort>,
    as_json: bool,
) -> Result<()> {
    let mut view = PostListView::new(ctx.data(), sort.unwrap_or(ctx.config.posts.default_sort));
    if let Some(search) = search {
        view.set_search(search);
    }
    view.refresh().map_err(fail)?;
    let posts = view.visible();

    if as_json {
        let rows: Vec<PostRow> = posts
            .iter()
            .map(|post| PostRow {
                post,
                comments: view.comment_count(post.id),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("No posts yet. Create one with '{}'.", "threadboard post create".cyan());
        return Ok(());
    }
    if posts.is_empty() {
        println!("No posts match your search.");
        return Ok(());
    }

    println!(
        "{} {}",
        "Posts".bold().underline(),
        format!("({})", view.sort().label()).dimmed()
    );
    for post in &posts {
        println!();
        println!(
            "{}",
            render::post_summary(post, view.comment_count(post.id), &ctx.config.ui.date_format)
        );
    }
    Ok(())
}

fn show_post(ctx: &AppContext, id: PostId, order: Option<SortOrder>) -> Result<()> {
    let mut detail = PostDetailView::new(ctx.data(), ctx.session(), id);
    detail.load().map_err(fail)?;
    let Some(post) = detail.post() else {
        return Ok(());
    };

    let date_format = &ctx.config.ui.date_format;
    println!("{}", render::post_detail(post, detail.vote_state(), date_format));

    let mut comments = CommentsView::open(
        ctx.data(),
        ctx.session(),
        id,
        order.unwrap_or(ctx.config.comments.default_order),
        CommentValidator::with_max_length(ctx.config.comments.max_length),
    )
    .map_err(fail)?;

    println!();
    println!(
        "{} {}",
        "Comments".bold().underline(),
        format!("({}, {})", comments.total(), comments.order()).dimmed()
    );
    if comments.total() == 0 {
        println!("{}", "No comments yet.".dimmed());
    } else {
        println!("{}", render::comment_tree(comments.tree(), date_format));
    }
    comments.close().map_err(fail)?;
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    Ok(dialoguer::Input::<String>::new()
        .with_prompt(label)
        .interact_text()?)
}

fn create_post(
    ctx: &AppContext,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    // Fail before prompting when nobody is signed in
    ctx.session().require_user("create a post").map_err(fail)?;

    let title = match title {
        Some(title) => title,
        None => prompt("Title")?,
    };
    let description = match description {
        Some(description) => description,
        None => prompt("Description")?,
    };

    let mut editor = PostEditor::new(ctx.data(), ctx.session(), PostValidator::new(&ctx.config.posts));
    let post = editor.create(&title, &description).map_err(fail)?;
    println!("{} Created post {}", "✓".green(), format!("#{}", post.id).yellow());
    Ok(())
}

fn edit_post(
    ctx: &AppContext,
    id: PostId,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let mut editor = PostEditor::new(ctx.data(), ctx.session(), PostValidator::new(&ctx.config.posts));
    let current = editor.load(id).map_err(fail)?.clone();

    if title.is_none() && description.is_none() {
        println!("Nothing to change; pass --title and/or --description.");
        return Ok(());
    }

    let title = title.unwrap_or(current.title);
    let description = description.unwrap_or(current.description);
    let post = editor.save(&title, &description).map_err(fail)?;
    println!("{} Updated post {}", "✓".green(), format!("#{}", post.id).yellow());
    Ok(())
}

fn delete_post(ctx: &AppContext, id: PostId, yes: bool) -> Result<()> {
    let mut detail = PostDetailView::new(ctx.data(), ctx.session(), id);
    detail.load().map_err(fail)?;

    // Non-authors get the permission error without a prompt
    let confirmation = if detail.can_edit() {
        let title = detail.post().map(|p| p.title.clone()).unwrap_or_default();
        confirm(
            &format!("Delete \"{}\" with all its comments and votes?", title),
            yes,
        )?
    } else {
        Confirmation::Declined
    };

    if detail.delete(confirmation).map_err(fail)? {
        println!("{} Deleted post {}", "✓".green(), format!("#{}", id).yellow());
    } else {
        println!("Delete cancelled.");
    }
    Ok(())
}

fn vote_post(ctx: &AppContext, id: PostId, direction: VoteKind) -> Result<()> {
    let mut detail = PostDetailView::new(ctx.data(), ctx.session(), id);
    detail.load().map_err(fail)?;
    let state = detail.vote(direction).map_err(fail)?;

    let label = format!("#{}", id).yellow();
    match state {
        VoteState::Upvoted => println!("{} Upvoted post {}", "✓".green(), label),
        VoteState::Downvoted => println!("{} Downvoted post {}", "✓".green(), label),
        VoteState::None => println!("{} Withdrew your vote on post {}", "✓".green(), label),
    }
    if let Some(post) = detail.post() {
        println!("    ▲{} ▼{}", post.upvotes, post.downvotes);
    }
    Ok(())
}
