//! Typed access to the forum tables

use super::data::{from_record, from_records, to_record, DataGateway, Filter, Query, Record, Table};
use crate::comment::{Comment, NewComment, SortOrder};
use crate::error::{ForumError, Result};
use crate::post::{NewPost, Post, PostChanges};
use crate::types::{CommentId, PostId};
use crate::vote::{NewVote, VoteCounters, VoteRecord, VoteWrite};
use serde_json::Value;
use std::sync::Arc;

/// Typed queries over a [`DataGateway`]
#[derive(Clone)]
pub struct ForumRepository {
    gateway: Arc<dyn DataGateway>,
}

impl ForumRepository {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    /// The underlying gateway
    pub fn gateway(&self) -> &Arc<dyn DataGateway> {
        &self.gateway
    }

    /// All posts, newest first
    pub fn posts(&self) -> Result<Vec<Post>> {
        let query = Query::table(Table::Posts).order_by("created_at", false);
        from_records(self.gateway.select(&query)?)
    }

    pub fn post(&self, id: PostId) -> Result<Option<Post>> {
        let query = Query::table(Table::Posts).eq("id", id.0);
        match self.gateway.select(&query)?.into_iter().next() {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    /// Like [`post`](Self::post), with a missing post as `NotFound`
    pub fn require_post(&self, id: PostId) -> Result<Post> {
        self.post(id)?
            .ok_or_else(|| ForumError::NotFound(format!("Post {}", id)))
    }

    pub fn insert_post(&self, post: &NewPost) -> Result<Post> {
        from_record(self.gateway.insert(Table::Posts, to_record(post)?)?)
    }

    pub fn update_post(&self, id: PostId, changes: &PostChanges) -> Result<()> {
        self.update_one(Table::Posts, id.0, to_record(changes)?, "Post")
    }

    /// Overwrite a post's vote tallies
    pub fn set_counters(&self, id: PostId, counters: VoteCounters) -> Result<()> {
        self.update_one(Table::Posts, id.0, to_record(&counters)?, "Post")
    }

    pub fn delete_post(&self, id: PostId) -> Result<()> {
        self.delete_one(Table::Posts, id.0, "Post")
    }

    /// Comments of one post ordered by creation time
    pub fn comments_for(&self, post_id: PostId, order: SortOrder) -> Result<Vec<Comment>> {
        let query = Query::table(Table::Comments)
            .eq("post_id", post_id.0)
            .order_by("created_at", order.is_ascending());
        from_records(self.gateway.select(&query)?)
    }

    /// Post id of every stored comment
    pub fn comment_post_ids(&self) -> Result<Vec<PostId>> {
        let rows = self.gateway.select(&Query::table(Table::Comments))?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("post_id").and_then(Value::as_i64))
            .map(PostId)
            .collect())
    }

    pub fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        from_record(self.gateway.insert(Table::Comments, to_record(comment)?)?)
    }

    pub fn update_comment_content(&self, id: CommentId, content: &str) -> Result<()> {
        let mut changes = Record::new();
        changes.insert("content".to_string(), Value::from(content));
        self.update_one(Table::Comments, id.0, changes, "Comment")
    }

    /// Delete a comment; the store removes its replies too
    pub fn delete_comment(&self, id: CommentId) -> Result<()> {
        self.delete_one(Table::Comments, id.0, "Comment")
    }

    /// The vote `email` cast on a post, if any
    pub fn vote_of(&self, post_id: PostId, email: &str) -> Result<Option<VoteRecord>> {
        let query = Query::table(Table::PostVotes)
            .eq("post_id", post_id.0)
            .eq("user_email", email);
        match self.gateway.select(&query)?.into_iter().next() {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    /// Persist one vote-record transition
    pub fn write_vote(&self, post_id: PostId, email: &str, write: VoteWrite) -> Result<()> {
        let filters = [
            Filter::eq("post_id", post_id.0),
            Filter::eq("user_email", email),
        ];
        match write {
            VoteWrite::Insert(kind) => {
                let vote = NewVote {
                    post_id,
                    user_email: email.to_string(),
                    vote_type: kind,
                };
                self.gateway.insert(Table::PostVotes, to_record(&vote)?)?;
            }
            VoteWrite::Update(kind) => {
                let mut changes = Record::new();
                changes.insert("vote_type".to_string(), Value::from(kind.as_str()));
                self.gateway.update(Table::PostVotes, &filters, changes)?;
            }
            VoteWrite::Delete => {
                self.gateway.delete(Table::PostVotes, &filters)?;
            }
        }
        Ok(())
    }

    fn update_one(&self, table: Table, id: i64, changes: Record, what: &str) -> Result<()> {
        match self.gateway.update(table, &[Filter::eq("id", id)], changes)? {
            0 => Err(ForumError::NotFound(format!("{} {}", what, id))),
            _ => Ok(()),
        }
    }

    fn delete_one(&self, table: Table, id: i64, what: &str) -> Result<()> {
        match self.gateway.delete(table, &[Filter::eq("id", id)])? {
            0 => Err(ForumError::NotFound(format!("{} {}", what, id))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryBackend;
    use crate::vote::{VoteKind, VoteState};

    fn repository() -> ForumRepository {
        ForumRepository::new(Arc::new(MemoryBackend::new()))
    }

    fn new_post() -> NewPost {
        NewPost {
            title: "Hello".to_string(),
            description: "World".to_string(),
            author: "alice@example.com".to_string(),
            upvotes: 0,
            downvotes: 0,
        }
    }

    #[test]
    fn test_post_lifecycle() {
        let repo = repository();
        let post = repo.insert_post(&new_post()).unwrap();
        assert_eq!(post.id, PostId(1));

        repo.update_post(
            post.id,
            &PostChanges {
                title: "Hi".to_string(),
                description: "There".to_string(),
            },
        )
        .unwrap();
        repo.set_counters(post.id, VoteCounters { upvotes: 2, downvotes: 1 })
            .unwrap();

        let loaded = repo.require_post(post.id).unwrap();
        assert_eq!(loaded.title, "Hi");
        assert_eq!(loaded.score(), 1);

        repo.delete_post(post.id).unwrap();
        assert!(repo.post(post.id).unwrap().is_none());
        assert!(repo.require_post(post.id).unwrap_err().is_not_found());
        assert!(repo.delete_post(post.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_comments_for_post() {
        let repo = repository();
        let post = repo.insert_post(&new_post()).unwrap();
        let root = repo
            .insert_comment(&NewComment {
                post_id: post.id,
                user_email: "bob@example.com".to_string(),
                content: "first".to_string(),
                parent_id: None,
            })
            .unwrap();
        let reply = repo
            .insert_comment(&NewComment {
                post_id: post.id,
                user_email: "alice@example.com".to_string(),
                content: "reply".to_string(),
                parent_id: Some(root.id),
            })
            .unwrap();

        let oldest = repo.comments_for(post.id, SortOrder::OldestFirst).unwrap();
        assert_eq!(oldest.iter().map(|c| c.id).collect::<Vec<_>>(), vec![root.id, reply.id]);
        assert_eq!(repo.comment_post_ids().unwrap(), vec![post.id, post.id]);

        repo.update_comment_content(reply.id, "edited").unwrap();
        repo.delete_comment(root.id).unwrap();
        assert!(repo.comments_for(post.id, SortOrder::NewestFirst).unwrap().is_empty());
    }

    #[test]
    fn test_vote_writes() {
        let repo = repository();
        let post = repo.insert_post(&new_post()).unwrap();
        let email = "bob@example.com";
        let state = |repo: &ForumRepository| {
            VoteState::from(repo.vote_of(post.id, email).unwrap().map(|v| v.vote_type))
        };

        repo.write_vote(post.id, email, VoteWrite::Insert(VoteKind::Upvote)).unwrap();
        assert_eq!(state(&repo), VoteState::Upvoted);

        repo.write_vote(post.id, email, VoteWrite::Update(VoteKind::Downvote)).unwrap();
        assert_eq!(state(&repo), VoteState::Downvoted);

        repo.write_vote(post.id, email, VoteWrite::Delete).unwrap();
        assert_eq!(state(&repo), VoteState::None);
    }
}
