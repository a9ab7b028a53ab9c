/// Authorization module for geopost-service
///
/// Provides ownership-based permission checks for posts and comments.
/// Only the author of a post or comment may modify or delete it.
use crate::error::{AppError, Result};
use crate::models::{CommentRecord, PostRecord};

/// Check if a user authored a post
pub fn check_post_ownership(user_id: i64, post: &PostRecord) -> Result<()> {
    if post.author.id == user_id {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "You can only modify your own posts".to_string(),
        ))
    }
}

/// Check if a user authored a comment
pub fn check_comment_ownership(user_id: i64, comment: &CommentRecord) -> Result<()> {
    if comment.author.id == user_id {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "You can only modify your own comments".to_string(),
        ))
    }
}
