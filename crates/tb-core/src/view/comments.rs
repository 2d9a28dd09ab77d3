//! Threaded comments of one post
//!
//! The view keeps the flat list it fetched, folds change events into it, and
//! rebuilds the reply tree from scratch after each one.

use super::{ensure_author, Banner, Confirmation};
use crate::comment::{
    find_node, forest_len, Comment, CommentBuilder, CommentNode, CommentTreeBuilder,
    CommentValidator, SortOrder,
};
use crate::error::{ForumError, Result};
use crate::gateway::{
    from_record, ChangeEvent, ChangeKind, DataGateway, Filter, ForumRepository, Subscription,
    Table,
};
use crate::session::SessionContext;
use crate::types::{CommentId, PostId};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct CommentsView {
    repo: ForumRepository,
    session: SessionContext,
    post_id: PostId,
    order: SortOrder,
    validator: CommentValidator,
    comments: Vec<Comment>,
    tree: Vec<CommentNode>,
    subscription: Option<Subscription>,
    closed: bool,
    banner: Banner,
}

impl CommentsView {
    /// Fetch the post's comments and start following changes to them
    pub fn open(
        gateway: Arc<dyn DataGateway>,
        session: SessionContext,
        post_id: PostId,
        order: SortOrder,
        validator: CommentValidator,
    ) -> Result<Self> {
        let mut view = Self {
            repo: ForumRepository::new(gateway),
            session,
            post_id,
            order,
            validator,
            comments: Vec::new(),
            tree: Vec::new(),
            subscription: None,
            closed: false,
            banner: Banner::default(),
        };
        view.connect()?;
        Ok(view)
    }

    // Subscribe before fetching so nothing written in between is missed;
    // events for rows already fetched are applied as upserts.
    fn connect(&mut self) -> Result<()> {
        let gateway = Arc::clone(self.repo.gateway());
        let subscription =
            gateway.subscribe(Table::Comments, Some(Filter::eq("post_id", self.post_id.0)))?;
        match self.repo.comments_for(self.post_id, self.order) {
            Ok(comments) => {
                debug!(post_id = %self.post_id, count = comments.len(), "loaded comments");
                self.comments = comments;
                self.subscription = Some(subscription);
                self.rebuild();
                Ok(())
            }
            Err(err) => {
                if let Err(unsubscribe_err) = gateway.unsubscribe(subscription) {
                    warn!(error = %unsubscribe_err, "failed to drop comment subscription");
                }
                Err(err)
            }
        }
    }

    fn rebuild(&mut self) {
        self.tree = CommentTreeBuilder::build(&self.comments, self.order);
    }

    /// Apply queued change events, returning how many changed the view
    ///
    /// Does nothing once the view is closed.
    pub fn pump(&mut self) -> usize {
        if self.closed {
            return 0;
        }
        let events = match &self.subscription {
            Some(subscription) => subscription.drain(),
            None => return 0,
        };
        let mut applied = 0;
        for event in &events {
            if self.apply_event(event) {
                applied += 1;
                self.rebuild();
            }
        }
        applied
    }

    fn apply_event(&mut self, event: &ChangeEvent) -> bool {
        let Some(record) = event.record() else {
            return false;
        };
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                match from_record::<Comment>(record.clone()) {
                    Ok(comment) if comment.post_id == self.post_id => {
                        self.upsert(comment);
                        true
                    }
                    Ok(_) => false,
                    Err(err) => {
                        warn!(error = %err, "ignoring malformed comment event");
                        false
                    }
                }
            }
            ChangeKind::Delete => match record.get("id").and_then(Value::as_i64) {
                Some(id) => {
                    let before = self.comments.len();
                    self.comments.retain(|c| c.id != CommentId(id));
                    self.comments.len() != before
                }
                None => false,
            },
        }
    }

    /// Replace or insert, keeping the flat list in fetch order
    fn upsert(&mut self, comment: Comment) {
        if let Some(pos) = self.comments.iter().position(|c| c.id == comment.id) {
            if self.comments[pos].created_at == comment.created_at {
                self.comments[pos] = comment;
                return;
            }
            self.comments.remove(pos);
        }
        // Equal timestamps go after existing ones, as in a fresh fetch
        let at = comment.created_at;
        let pos = match self.order {
            SortOrder::NewestFirst => self.comments.partition_point(|c| c.created_at >= at),
            SortOrder::OldestFirst => self.comments.partition_point(|c| c.created_at <= at),
        };
        self.comments.insert(pos, comment);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ForumError::Validation(
                "Comments view is closed".to_string(),
            ));
        }
        Ok(())
    }

    fn find(&self, id: CommentId) -> Result<&Comment> {
        self.comments
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ForumError::NotFound(format!("Comment {}", id)))
    }

    /// Post a top-level comment
    pub fn add(&mut self, content: &str) -> Result<Comment> {
        let result = self.post_comment(content, None);
        self.banner.capture("Failed to add comment", result)
    }

    /// Reply to an existing comment
    pub fn reply(&mut self, parent_id: CommentId, content: &str) -> Result<Comment> {
        let result = self.post_comment(content, Some(parent_id));
        self.banner.capture("Failed to post reply", result)
    }

    fn post_comment(&mut self, content: &str, parent_id: Option<CommentId>) -> Result<Comment> {
        self.ensure_open()?;
        let action = if parent_id.is_some() { "reply" } else { "comment" };
        let user = self.session.require_user(action)?;

        let mut builder = CommentBuilder::new(self.post_id)
            .author(user.email)
            .content(content)
            .validator(self.validator);
        if let Some(parent_id) = parent_id {
            self.find(parent_id)?;
            builder = builder.reply_to(parent_id);
        }
        let new_comment = builder.build()?;

        let comment = self.repo.insert_comment(&new_comment)?;
        info!(comment_id = %comment.id, post_id = %self.post_id, "posted comment");
        self.upsert(comment.clone());
        self.rebuild();
        Ok(comment)
    }

    /// Replace the text of one of the user's own comments
    pub fn edit(&mut self, id: CommentId, content: &str) -> Result<Comment> {
        let result = self.change(id, content);
        self.banner.capture("Failed to update comment", result)
    }

    fn change(&mut self, id: CommentId, content: &str) -> Result<Comment> {
        self.ensure_open()?;
        let user = self.session.require_user("edit a comment")?;
        let existing = self.find(id)?.clone();
        ensure_author(&existing.user_email, &user, "comment")?;
        let content = self.validator.validate_content(content)?.to_string();

        self.repo.update_comment_content(id, &content)?;
        let updated = Comment {
            content,
            ..existing
        };
        self.upsert(updated.clone());
        self.rebuild();
        Ok(updated)
    }

    /// Delete one of the user's own comments together with its replies
    ///
    /// Returns `false` without touching the store when the user declined.
    pub fn delete(&mut self, id: CommentId, confirmation: Confirmation) -> Result<bool> {
        let result = self.remove(id, confirmation);
        self.banner.capture("Failed to delete comment", result)
    }

    fn remove(&mut self, id: CommentId, confirmation: Confirmation) -> Result<bool> {
        self.ensure_open()?;
        let user = self.session.require_user("delete a comment")?;
        ensure_author(&self.find(id)?.user_email, &user, "comment")?;
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        self.repo.delete_comment(id)?;
        info!(comment_id = %id, "deleted comment");
        let mut doomed: HashSet<CommentId> = find_node(&self.tree, id)
            .map(|node| node.walk().map(|(_, n)| n.id()).collect())
            .unwrap_or_default();
        doomed.insert(id);
        self.comments.retain(|c| !doomed.contains(&c.id));
        self.rebuild();
        Ok(true)
    }

    /// Switch root ordering; re-fetches and re-subscribes
    pub fn set_order(&mut self, order: SortOrder) -> Result<()> {
        let result = self.reorder(order);
        self.banner.capture("Failed to load comments", result)
    }

    fn reorder(&mut self, order: SortOrder) -> Result<()> {
        self.ensure_open()?;
        if let Some(subscription) = self.subscription.take() {
            self.repo.gateway().unsubscribe(subscription)?;
        }
        let previous = std::mem::replace(&mut self.order, order);
        if let Err(err) = self.connect() {
            self.order = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Stop following changes; later events are ignored
    pub fn close(&mut self) -> Result<()> {
        self.closed = true;
        match self.subscription.take() {
            Some(subscription) => {
                debug!(post_id = %self.post_id, "closing comments view");
                self.repo.gateway().unsubscribe(subscription)
            }
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Root nodes in display order
    pub fn tree(&self) -> &[CommentNode] {
        &self.tree
    }

    /// Total number of comments, replies included
    pub fn total(&self) -> usize {
        forest_len(&self.tree)
    }

    /// Whether the signed-in user may edit or delete `id`
    pub fn can_modify(&self, id: CommentId) -> bool {
        match (self.find(id), self.session.email()) {
            (Ok(comment), Some(email)) => comment.is_authored_by(&email),
            _ => false,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.banner.message()
    }
}

impl Drop for CommentsView {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close comments view");
        }
    }
}
