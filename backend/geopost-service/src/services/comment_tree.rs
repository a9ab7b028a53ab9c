//! Reply tree assembly.
//!
//! Comments are stored flat with a parent pointer. The whole post is loaded
//! once and children are attached by id through an arena of indices, so no
//! per-node queries are issued and parent pointers are never chased. Only
//! nodes reachable downward from a top-level comment are emitted, which keeps
//! assembly finite even when stored parent links form a cycle.

use crate::metrics::ORPHAN_REPLIES_DROPPED;
use crate::models::{CommentRecord, CommentResponse};
use std::collections::HashMap;

/// Build the reply forest for one post.
///
/// Roots and every `replies` list are in ascending `created_at` order. The
/// sort is stable, so input that is already in creation order is kept as is
/// and ties keep their input order. Replies whose parent is not part of
/// `comments` are left out.
pub fn build_comment_tree(comments: &[CommentRecord]) -> Vec<CommentResponse> {
    let mut order: Vec<usize> = (0..comments.len()).collect();
    order.sort_by_key(|&idx| comments[idx].comment.created_at);

    let index: HashMap<i64, usize> = order
        .iter()
        .map(|&idx| (comments[idx].comment.id, idx))
        .collect();

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];

    for &idx in &order {
        let comment = &comments[idx].comment;
        match comment.parent_comment_id {
            None => roots.push(idx),
            Some(parent_id) => match index.get(&parent_id) {
                Some(&parent_idx) => children[parent_idx].push(idx),
                None => {
                    ORPHAN_REPLIES_DROPPED.inc();
                    tracing::debug!(
                        comment_id = comment.id,
                        parent_id,
                        "dropping reply whose parent is not in this post"
                    );
                }
            },
        }
    }

    // Post-order over an explicit stack: deep threads cannot exhaust the call stack
    let mut built: Vec<Option<CommentResponse>> = (0..comments.len()).map(|_| None).collect();
    for &root in &roots {
        let mut stack = vec![(root, false)];
        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                let replies = children[idx]
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect();
                built[idx] = Some(CommentResponse::with_replies(&comments[idx], replies));
            } else {
                stack.push((idx, true));
                stack.extend(children[idx].iter().rev().map(|&child| (child, false)));
            }
        }
    }

    roots
        .into_iter()
        .filter_map(|root| built[root].take())
        .collect()
}

/// Format a single comment with one level of replies.
///
/// Each reply is emitted with an empty `replies` list; nothing below the
/// first level is loaded or attached.
pub fn attach_direct_replies(
    comment: &CommentRecord,
    replies: &[CommentRecord],
) -> CommentResponse {
    let replies = replies.iter().map(CommentResponse::leaf).collect();
    CommentResponse::with_replies(comment, replies)
}
