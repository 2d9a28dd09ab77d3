//! Post list (home screen)

use super::Banner;
use crate::error::Result;
use crate::gateway::{DataGateway, ForumRepository};
use crate::post::{count_comments, filter_and_sort, Post, PostSort};
use crate::types::PostId;
use std::collections::HashMap;
use std::sync::Arc;

/// Searchable, sortable list of every post
pub struct PostListView {
    repo: ForumRepository,
    posts: Vec<Post>,
    comment_counts: HashMap<PostId, usize>,
    search: String,
    sort: PostSort,
    banner: Banner,
}

impl PostListView {
    pub fn new(gateway: Arc<dyn DataGateway>, sort: PostSort) -> Self {
        Self {
            repo: ForumRepository::new(gateway),
            posts: Vec::new(),
            comment_counts: HashMap::new(),
            search: String::new(),
            sort,
            banner: Banner::default(),
        }
    }

    /// Reload posts and comment counts
    pub fn refresh(&mut self) -> Result<()> {
        let result = self.fetch();
        self.banner.capture("Failed to load posts", result)
    }

    fn fetch(&mut self) -> Result<()> {
        let posts = self.repo.posts()?;
        let counts = count_comments(&posts, self.repo.comment_post_ids()?);
        self.posts = posts;
        self.comment_counts = counts;
        Ok(())
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_sort(&mut self, sort: PostSort) {
        self.sort = sort;
    }

    pub fn sort(&self) -> PostSort {
        self.sort
    }

    /// Posts matching the search, in the selected order
    pub fn visible(&self) -> Vec<Post> {
        filter_and_sort(&self.posts, &self.search, self.sort, &self.comment_counts)
    }

    pub fn comment_count(&self, post_id: PostId) -> usize {
        self.comment_counts.get(&post_id).copied().unwrap_or(0)
    }

    /// Number of loaded posts, ignoring the search
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn error(&self) -> Option<&str> {
        self.banner.message()
    }
}
