//! Reply tree reconstruction
//!
//! Comments are stored flat, each optionally naming its parent. This module
//! reassembles them into a forest for display. Only the roots are sorted;
//! replies keep the order in which they were supplied.

use super::model::{Comment, SortOrder};
use crate::types::CommentId;
use std::collections::HashMap;
use tracing::warn;

/// A comment together with its replies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Identifier of the wrapped comment
    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    /// Number of nodes in this subtree, including self
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Check if the node has no replies
    pub fn is_leaf(&self) -> bool {
        self.replies.is_empty()
    }

    /// Depth-first traversal yielding `(depth, node)`, self at depth 0
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

// Reply chains can be arbitrarily deep; unlink them iteratively so dropping a
// tree never recurses once per level.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

/// Pre-order iterator over a subtree
pub struct Walk<'a> {
    stack: Vec<(usize, &'a CommentNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a CommentNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for reply in node.replies.iter().rev() {
            self.stack.push((depth + 1, reply));
        }
        Some((depth, node))
    }
}

/// Total node count of a forest
pub fn forest_len(forest: &[CommentNode]) -> usize {
    forest.iter().map(CommentNode::len).sum()
}

/// Find a node anywhere in a forest
pub fn find_node(forest: &[CommentNode], id: CommentId) -> Option<&CommentNode> {
    forest
        .iter()
        .flat_map(|root| root.walk())
        .map(|(_, node)| node)
        .find(|node| node.id() == id)
}

/// Builds reply forests from flat comment lists
pub struct CommentTreeBuilder;

impl CommentTreeBuilder {
    /// Assemble `comments` into a forest of root nodes
    ///
    /// A comment whose parent is missing from `comments` becomes a root.
    /// When several comments share an id, replies attach to the last one
    /// supplied; every comment still yields exactly one node. Cyclic parent
    /// chains are cut at the member that appears first in the input.
    pub fn build(comments: &[Comment], order: SortOrder) -> Vec<CommentNode> {
        let mut index: HashMap<CommentId, usize> = HashMap::with_capacity(comments.len());
        for (i, comment) in comments.iter().enumerate() {
            index.insert(comment.id, i);
        }

        let mut parents: Vec<Option<usize>> = comments
            .iter()
            .map(|c| c.parent_id.and_then(|p| index.get(&p).copied()))
            .collect();
        break_cycles(comments, &mut parents);

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
        let mut roots = Vec::new();
        for (i, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(i),
                None => roots.push(i),
            }
        }

        // sort_by is stable: equal timestamps keep input order
        roots.sort_by(|&a, &b| {
            let (a, b) = (&comments[a].created_at, &comments[b].created_at);
            match order {
                SortOrder::NewestFirst => b.cmp(a),
                SortOrder::OldestFirst => a.cmp(b),
            }
        });

        assemble(comments, &children, &roots)
    }
}

/// Build nodes children-first, so no call recurses per nesting level
fn assemble(comments: &[Comment], children: &[Vec<usize>], roots: &[usize]) -> Vec<CommentNode> {
    let mut preorder = Vec::with_capacity(comments.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(i) = stack.pop() {
        preorder.push(i);
        stack.extend(children[i].iter().rev().copied());
    }

    let mut built: Vec<Option<CommentNode>> = vec![None; comments.len()];
    for &i in preorder.iter().rev() {
        let replies = children[i]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[i] = Some(CommentNode {
            comment: comments[i].clone(),
            replies,
        });
    }

    roots.iter().filter_map(|&i| built[i].take()).collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    OnPath,
    Done,
}

/// Detach one member of every parent cycle so each chain ends at a root
fn break_cycles(comments: &[Comment], parents: &mut [Option<usize>]) {
    let mut visit = vec![Visit::Unseen; parents.len()];
    let mut path: Vec<usize> = Vec::new();

    for start in 0..parents.len() {
        path.clear();
        let mut current = Some(start);
        while let Some(i) = current {
            match visit[i] {
                Visit::Done => break,
                Visit::OnPath => {
                    if let Some(pos) = path.iter().position(|&p| p == i) {
                        if let Some(&head) = path[pos..].iter().min() {
                            warn!(
                                comment_id = %comments[head].id,
                                cycle_len = path.len() - pos,
                                "cyclic parent chain in comments, treating as root"
                            );
                            parents[head] = None;
                        }
                    }
                    break;
                }
                Visit::Unseen => {
                    visit[i] = Visit::OnPath;
                    path.push(i);
                    current = parents[i];
                }
            }
        }
        for &i in &path {
            visit[i] = Visit::Done;
        }
    }
}
