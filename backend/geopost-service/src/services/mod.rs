/// Business logic layer for geopost-service
///
/// This module provides high-level operations:
/// - Post service: Post creation, retrieval, updates, cascading deletes, map markers
/// - Comment service: Comment creation, threading, updates, deletes
/// - Comment tree: Flat comment rows to nested reply forests
pub mod comment_tree;
pub mod comments;
pub mod posts;

// Re-export commonly used services
pub use comment_tree::{attach_direct_replies, build_comment_tree};
pub use comments::{CommentService, CreateComment, UpdateComment};
pub use posts::{parse_id, resolve_coordinates, CreatePost, PostService, UpdatePost};
