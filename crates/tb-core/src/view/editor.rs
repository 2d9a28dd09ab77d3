//! Create and edit posts

use super::{ensure_author, Banner, Confirmation};
use crate::error::{ForumError, Result};
use crate::gateway::{DataGateway, ForumRepository};
use crate::post::{NewPost, Post, PostChanges, PostValidator};
use crate::session::SessionContext;
use crate::types::PostId;
use std::sync::Arc;
use tracing::info;

/// Form backing post creation and editing
pub struct PostEditor {
    repo: ForumRepository,
    session: SessionContext,
    validator: PostValidator,
    editing: Option<Post>,
    banner: Banner,
}

impl PostEditor {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        session: SessionContext,
        validator: PostValidator,
    ) -> Self {
        Self {
            repo: ForumRepository::new(gateway),
            session,
            validator,
            editing: None,
            banner: Banner::default(),
        }
    }

    /// Publish a new post as the signed-in user
    pub fn create(&mut self, title: &str, description: &str) -> Result<Post> {
        let result = self.insert(title, description);
        self.banner.capture("Failed to create post", result)
    }

    fn insert(&self, title: &str, description: &str) -> Result<Post> {
        let user = self.session.require_user("create a post")?;
        let (title, description) = self.validator.validate(title, description)?;
        let post = self.repo.insert_post(&NewPost {
            title: title.to_string(),
            description: description.to_string(),
            author: user.email,
            upvotes: 0,
            downvotes: 0,
        })?;
        info!(post_id = %post.id, "created post");
        Ok(post)
    }

    /// Load a post for editing; only its author may
    pub fn load(&mut self, id: PostId) -> Result<&Post> {
        let result = self.fetch(id);
        let post = self.banner.capture("Failed to load post", result)?;
        let post: &Post = self.editing.insert(post);
        Ok(post)
    }

    fn fetch(&self, id: PostId) -> Result<Post> {
        let user = self.session.require_user("edit a post")?;
        let post = self.repo.require_post(id)?;
        ensure_author(&post.author, &user, "post")?;
        Ok(post)
    }

    /// The post being edited
    pub fn editing(&self) -> Option<&Post> {
        self.editing.as_ref()
    }

    /// Save new title and description for the loaded post
    pub fn save(&mut self, title: &str, description: &str) -> Result<Post> {
        let result = self.update(title, description);
        let post = self.banner.capture("Failed to update post", result)?;
        self.editing = Some(post.clone());
        Ok(post)
    }

    fn update(&self, title: &str, description: &str) -> Result<Post> {
        let user = self.session.require_user("edit a post")?;
        let current = self.loaded()?;
        ensure_author(&current.author, &user, "post")?;
        let (title, description) = self.validator.validate(title, description)?;
        self.repo.update_post(
            current.id,
            &PostChanges {
                title: title.to_string(),
                description: description.to_string(),
            },
        )?;
        info!(post_id = %current.id, "updated post");
        self.repo.require_post(current.id)
    }

    /// Delete the loaded post
    pub fn delete(&mut self, confirmation: Confirmation) -> Result<bool> {
        let result = self.remove(confirmation);
        let deleted = self.banner.capture("Failed to delete post", result)?;
        if deleted {
            self.editing = None;
        }
        Ok(deleted)
    }

    fn remove(&self, confirmation: Confirmation) -> Result<bool> {
        let user = self.session.require_user("delete a post")?;
        let current = self.loaded()?;
        ensure_author(&current.author, &user, "post")?;
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }
        self.repo.delete_post(current.id)?;
        info!(post_id = %current.id, "deleted post");
        Ok(true)
    }

    fn loaded(&self) -> Result<&Post> {
        self.editing
            .as_ref()
            .ok_or_else(|| ForumError::Validation("No post loaded for editing".to_string()))
    }

    pub fn error(&self) -> Option<&str> {
        self.banner.message()
    }
}
