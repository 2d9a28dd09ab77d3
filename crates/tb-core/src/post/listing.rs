//! Post list filtering and ordering

use super::model::Post;
use crate::types::PostId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Sort options of the post list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSort {
    /// Newest first
    #[default]
    CreatedAtDesc,
    /// Oldest first
    CreatedAtAsc,
    /// Most upvotes
    UpvotesDesc,
    /// Least upvotes
    UpvotesAsc,
    /// A-Z
    TitleAsc,
    /// Z-A
    TitleDesc,
    /// Most comments
    CommentsDesc,
    /// Least comments
    CommentsAsc,
}

impl PostSort {
    /// All options, in menu order
    pub const ALL: [PostSort; 8] = [
        PostSort::CreatedAtDesc,
        PostSort::CreatedAtAsc,
        PostSort::UpvotesDesc,
        PostSort::UpvotesAsc,
        PostSort::TitleAsc,
        PostSort::TitleDesc,
        PostSort::CommentsDesc,
        PostSort::CommentsAsc,
    ];

    /// Key used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSort::CreatedAtDesc => "created_at_desc",
            PostSort::CreatedAtAsc => "created_at_asc",
            PostSort::UpvotesDesc => "upvotes_desc",
            PostSort::UpvotesAsc => "upvotes_asc",
            PostSort::TitleAsc => "title_asc",
            PostSort::TitleDesc => "title_desc",
            PostSort::CommentsDesc => "comments_desc",
            PostSort::CommentsAsc => "comments_asc",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            PostSort::CreatedAtDesc => "Newest first",
            PostSort::CreatedAtAsc => "Oldest first",
            PostSort::UpvotesDesc => "Most upvotes",
            PostSort::UpvotesAsc => "Least upvotes",
            PostSort::TitleAsc => "Title (A-Z)",
            PostSort::TitleDesc => "Title (Z-A)",
            PostSort::CommentsDesc => "Most comments",
            PostSort::CommentsAsc => "Least comments",
        }
    }

    fn compare(&self, a: &Post, b: &Post, counts: &HashMap<PostId, usize>) -> Ordering {
        let comments = |p: &Post| counts.get(&p.id).copied().unwrap_or(0);
        match self {
            PostSort::CreatedAtDesc => b.created_at.cmp(&a.created_at),
            PostSort::CreatedAtAsc => a.created_at.cmp(&b.created_at),
            PostSort::UpvotesDesc => b.upvotes.cmp(&a.upvotes),
            PostSort::UpvotesAsc => a.upvotes.cmp(&b.upvotes),
            PostSort::TitleAsc => compare_titles(&a.title, &b.title),
            PostSort::TitleDesc => compare_titles(&b.title, &a.title),
            PostSort::CommentsDesc => comments(b).cmp(&comments(a)),
            PostSort::CommentsAsc => comments(a).cmp(&comments(b)),
        }
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostSort {
    type Err = crate::ForumError;

    fn from_str(s: &str) -> crate::Result<Self> {
        PostSort::ALL
            .iter()
            .copied()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| {
                crate::ForumError::Validation(format!("Unknown post sort '{}'", s))
            })
    }
}

// Case-insensitive first so "apple" sorts next to "Apple"
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Count comments per post; every post in `posts` gets an entry
///
/// Comments pointing at posts outside `posts` are ignored.
pub fn count_comments(
    posts: &[Post],
    comment_post_ids: impl IntoIterator<Item = PostId>,
) -> HashMap<PostId, usize> {
    let mut counts: HashMap<PostId, usize> = posts.iter().map(|p| (p.id, 0)).collect();
    for post_id in comment_post_ids {
        if let Some(count) = counts.get_mut(&post_id) {
            *count += 1;
        }
    }
    counts
}

/// Filter by case-insensitive title search, then stable-sort
pub fn filter_and_sort(
    posts: &[Post],
    search: &str,
    sort: PostSort,
    comment_counts: &HashMap<PostId, usize>,
) -> Vec<Post> {
    let needle = search.trim().to_lowercase();
    let mut filtered: Vec<Post> = posts
        .iter()
        .filter(|p| needle.is_empty() || p.title.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| sort.compare(a, b, comment_counts));
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn post(id: i64, title: &str, upvotes: u64, t: i64) -> Post {
        Post {
            id: PostId(id),
            title: title.to_string(),
            description: String::new(),
            author: "alice@example.com".to_string(),
            upvotes,
            downvotes: 0,
            created_at: Utc.timestamp_opt(t, 0).unwrap(),
        }
    }

    fn ids(posts: &[Post]) -> Vec<i64> {
        posts.iter().map(|p| p.id.0).collect()
    }

    fn sample() -> Vec<Post> {
        vec![
            post(1, "banana bread", 5, 100),
            post(2, "Apple pie", 1, 300),
            post(3, "cherry tart", 9, 200),
        ]
    }

    #[test]
    fn test_count_comments() {
        let posts = sample();
        let counts = count_comments(&posts, vec![PostId(1), PostId(3), PostId(1), PostId(99)]);
        assert_eq!(counts.get(&PostId(1)), Some(&2));
        assert_eq!(counts.get(&PostId(2)), Some(&0));
        assert_eq!(counts.get(&PostId(3)), Some(&1));
        assert_eq!(counts.get(&PostId(99)), None);
    }

    #[test]
    fn test_sort_by_date_and_votes() {
        let posts = sample();
        let counts = HashMap::new();
        assert_eq!(ids(&filter_and_sort(&posts, "", PostSort::CreatedAtDesc, &counts)), vec![2, 3, 1]);
        assert_eq!(ids(&filter_and_sort(&posts, "", PostSort::CreatedAtAsc, &counts)), vec![1, 3, 2]);
        assert_eq!(ids(&filter_and_sort(&posts, "", PostSort::UpvotesDesc, &counts)), vec![3, 1, 2]);
        assert_eq!(ids(&filter_and_sort(&posts, "", PostSort::UpvotesAsc, &counts)), vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_by_title_ignores_case() {
        let posts = sample();
        let counts = HashMap::new();
        assert_eq!(ids(&filter_and_sort(&posts, "", PostSort::TitleAsc, &counts)), vec![2, 1, 3]);
        assert_eq!(ids(&filter_and_sort(&posts, "", PostSort::TitleDesc, &counts)), vec![3, 1, 2]);
    }

    #[test]
    fn test_sort_by_comments_is_stable() {
        let posts = sample();
        let counts = count_comments(&posts, vec![PostId(2), PostId(2)]);
        assert_eq!(ids(&filter_and_sort(&posts, "", PostSort::CommentsDesc, &counts)), vec![2, 1, 3]);
        assert_eq!(ids(&filter_and_sort(&posts, "", PostSort::CommentsAsc, &counts)), vec![1, 3, 2]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let posts = sample();
        let counts = HashMap::new();
        assert_eq!(ids(&filter_and_sort(&posts, "APPLE", PostSort::CreatedAtDesc, &counts)), vec![2]);
        assert_eq!(ids(&filter_and_sort(&posts, "  ", PostSort::CreatedAtAsc, &counts)), vec![1, 3, 2]);
        assert!(filter_and_sort(&posts, "kiwi", PostSort::CreatedAtDesc, &counts).is_empty());
    }

    #[test]
    fn test_sort_parse_roundtrip_names() {
        for sort in PostSort::ALL {
            assert_eq!(sort.as_str().parse::<PostSort>().unwrap(), sort);
        }
        assert!("popularity".parse::<PostSort>().is_err());
    }
}
