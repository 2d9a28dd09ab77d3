//! Terminal rendering of posts and comment threads

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use tb_core::comment::CommentNode;
use tb_core::post::Post;
use tb_core::types::username_from_email;
use tb_core::vote::VoteState;

/// Timestamp in local time with the configured chrono format
pub fn format_date(at: &DateTime<Utc>, format: &str) -> String {
    at.with_timezone(&Local).format(format).to_string()
}

fn votes(post: &Post, vote: VoteState) -> String {
    let up = format!("▲{}", post.upvotes);
    let down = format!("▼{}", post.downvotes);
    match vote {
        VoteState::Upvoted => format!("{} {}", up.green().bold(), down),
        VoteState::Downvoted => format!("{} {}", up, down.red().bold()),
        VoteState::None => format!("{} {}", up, down),
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// One line per post in the list, plus a metadata line
pub fn post_summary(post: &Post, comments: usize, date_format: &str) -> String {
    format!(
        "{} {}\n    by {} · {} · {} · {}",
        format!("#{}", post.id).yellow(),
        post.title.bold(),
        username_from_email(&post.author).cyan(),
        format_date(&post.created_at, date_format).dimmed(),
        votes(post, VoteState::None),
        plural(comments, "comment"),
    )
}

/// Full post with body
pub fn post_detail(post: &Post, vote: VoteState, date_format: &str) -> String {
    let mut out = format!(
        "{} {}\nby {} · {} · {}",
        format!("#{}", post.id).yellow(),
        post.title.bold().underline(),
        username_from_email(&post.author).cyan(),
        format_date(&post.created_at, date_format).dimmed(),
        votes(post, vote),
    );
    out.push_str("\n\n");
    out.push_str(&post.description);
    out
}

/// Indented comment forest, one comment per block
pub fn comment_tree(forest: &[CommentNode], date_format: &str) -> String {
    let mut lines = Vec::new();
    for (depth, node) in forest.iter().flat_map(|root| root.walk()) {
        let indent = "    ".repeat(depth);
        let comment = &node.comment;
        let marker = if depth == 0 { "•" } else { "↳" };
        lines.push(format!(
            "{}{} {} {} {}",
            indent,
            marker,
            format!("[{}]", comment.id).yellow(),
            username_from_email(&comment.user_email).cyan(),
            format_date(&comment.created_at, date_format).dimmed(),
        ));
        for text_line in comment.content.lines() {
            lines.push(format!("{}  {}", indent, text_line));
        }
    }
    lines.join("\n")
}
