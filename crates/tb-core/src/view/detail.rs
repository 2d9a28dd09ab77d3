//! Single post with voting

use super::{ensure_author, Banner, Confirmation};
use crate::error::{ForumError, Result};
use crate::gateway::{DataGateway, ForumRepository};
use crate::post::Post;
use crate::session::SessionContext;
use crate::types::PostId;
use crate::vote::{reconcile, Reconciliation, VoteCounters, VoteKind, VoteState, VoteWrite};
use std::sync::Arc;
use tracing::{info, warn};

/// What the detail view currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostState {
    Loading,
    Loaded(Post),
    NotFound,
    Deleted,
}

/// One post, the viewer's vote on it, and author actions
pub struct PostDetailView {
    repo: ForumRepository,
    session: SessionContext,
    post_id: PostId,
    state: PostState,
    vote: VoteState,
    banner: Banner,
}

impl PostDetailView {
    pub fn new(gateway: Arc<dyn DataGateway>, session: SessionContext, post_id: PostId) -> Self {
        Self {
            repo: ForumRepository::new(gateway),
            session,
            post_id,
            state: PostState::Loading,
            vote: VoteState::None,
            banner: Banner::default(),
        }
    }

    /// Fetch the post and the signed-in user's vote on it
    pub fn load(&mut self) -> Result<()> {
        let result = self.fetch();
        self.banner.capture("Failed to load post", result)
    }

    fn fetch(&mut self) -> Result<()> {
        let Some(post) = self.repo.post(self.post_id)? else {
            self.state = PostState::NotFound;
            self.vote = VoteState::None;
            return Err(self.not_found());
        };
        let vote = match self.session.email() {
            Some(email) => VoteState::from(
                self.repo
                    .vote_of(post.id, &email)?
                    .map(|record| record.vote_type),
            ),
            None => VoteState::None,
        };
        self.state = PostState::Loaded(post);
        self.vote = vote;
        Ok(())
    }

    fn not_found(&self) -> ForumError {
        ForumError::NotFound(format!("Post {}", self.post_id))
    }

    pub fn state(&self) -> &PostState {
        &self.state
    }

    pub fn post(&self) -> Option<&Post> {
        match &self.state {
            PostState::Loaded(post) => Some(post),
            _ => None,
        }
    }

    pub fn vote_state(&self) -> VoteState {
        self.vote
    }

    /// Whether the signed-in user wrote the post
    pub fn can_edit(&self) -> bool {
        match (self.post(), self.session.email()) {
            (Some(post), Some(email)) => post.is_authored_by(&email),
            _ => false,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.banner.message()
    }

    /// Cast, switch or withdraw the signed-in user's vote
    pub fn vote(&mut self, kind: VoteKind) -> Result<VoteState> {
        let result = self.apply_vote(kind);
        self.banner
            .capture(&format!("Failed to {} post", kind), result)
    }

    fn apply_vote(&mut self, kind: VoteKind) -> Result<VoteState> {
        let user = self.session.require_user("vote")?;
        let post = self.post().cloned().ok_or_else(|| self.not_found())?;
        let Reconciliation { next, delta } = reconcile(self.vote, kind);

        if let Some(write) = VoteWrite::between(self.vote, next) {
            self.repo.write_vote(post.id, &user.email, write)?;
        }
        self.vote = next;

        // Second, independent write; a failure here leaves the vote record
        // and the counters out of step until the next vote on this post.
        let counters = VoteCounters::of(&post).apply(delta);
        if let Err(err) = self.repo.set_counters(post.id, counters) {
            warn!(
                post_id = %post.id,
                vote = ?next,
                error = %err,
                "vote recorded but post counters were not updated"
            );
            return Err(err);
        }

        if let PostState::Loaded(post) = &mut self.state {
            post.upvotes = counters.upvotes;
            post.downvotes = counters.downvotes;
        }
        Ok(next)
    }

    /// Delete the post; only its author may
    ///
    /// Returns `false` without touching the store when the user declined.
    pub fn delete(&mut self, confirmation: Confirmation) -> Result<bool> {
        let result = self.remove(confirmation);
        self.banner.capture("Failed to delete post", result)
    }

    fn remove(&mut self, confirmation: Confirmation) -> Result<bool> {
        let user = self.session.require_user("delete a post")?;
        let post = self.post().cloned().ok_or_else(|| self.not_found())?;
        ensure_author(&post.author, &user, "post")?;
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }
        self.repo.delete_post(post.id)?;
        info!(post_id = %post.id, "deleted post");
        self.state = PostState::Deleted;
        self.vote = VoteState::None;
        Ok(true)
    }
}
