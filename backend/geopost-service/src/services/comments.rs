/// Comment service - handles comment creation, threading, and ownership-checked mutation
use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::middleware::permissions::check_comment_ownership;
use crate::models::{CommentRecord, CommentResponse, DeleteAck, NewComment, User};
use crate::services::comment_tree::{attach_direct_replies, build_comment_tree};
use std::sync::Arc;

/// Input for a new comment
#[derive(Debug, Clone, PartialEq)]
pub struct CreateComment {
    pub content: String,
    pub parent_comment_id: Option<i64>,
}

/// Partial comment update; `None` or empty content leaves the text as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateComment {
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn ContentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Look up the authenticated caller; a token for a deleted account is rejected
    pub async fn resolve_author(&self, user_id: i64) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(format!("user {} is not registered", user_id)))
    }

    /// Create a comment, optionally as a reply to another comment on the same post
    pub async fn create_comment(
        &self,
        post_id: i64,
        input: CreateComment,
        user: &User,
    ) -> Result<CommentResponse> {
        if self.store.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {} not found", post_id)));
        }

        if let Some(parent_id) = input.parent_comment_id {
            if self.store.find_comment(post_id, parent_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "parent comment {} not found",
                    parent_id
                )));
            }
        }

        let comment = self
            .store
            .insert_comment(NewComment {
                post_id,
                user_id: user.id,
                parent_comment_id: input.parent_comment_id,
                content: input.content,
            })
            .await?;

        tracing::info!(
            post_id,
            comment_id = comment.id,
            user_id = user.id,
            parent_comment_id = ?comment.parent_comment_id,
            "comment created"
        );

        Ok(CommentResponse::leaf(&CommentRecord {
            comment,
            author: user.clone(),
        }))
    }

    /// Get the reply forest for a post
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentResponse>> {
        let comments = self.store.list_comments(post_id).await?;
        Ok(build_comment_tree(&comments))
    }

    /// Get a single comment with its direct replies
    pub async fn get_comment(&self, post_id: i64, comment_id: i64) -> Result<CommentResponse> {
        let comment = self.load_comment(post_id, comment_id).await?;
        let replies = self.store.list_replies(comment_id).await?;
        Ok(attach_direct_replies(&comment, &replies))
    }

    /// Update comment content
    pub async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        input: UpdateComment,
        user: &User,
    ) -> Result<CommentResponse> {
        let CommentRecord {
            mut comment,
            author,
        } = self.load_owned_comment(post_id, comment_id, user).await?;

        if let Some(content) = input.content.filter(|c| !c.is_empty()) {
            comment.content = content;
        }

        let saved = self.store.save_comment(&comment).await?;
        tracing::debug!(post_id, comment_id, user_id = user.id, "comment saved");

        Ok(CommentResponse::leaf(&CommentRecord {
            comment: saved,
            author,
        }))
    }

    /// Delete a comment; replies are not removed by this call
    pub async fn delete_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        user: &User,
    ) -> Result<DeleteAck> {
        self.load_owned_comment(post_id, comment_id, user).await?;
        self.store.delete_comment(comment_id).await?;

        tracing::info!(post_id, comment_id, user_id = user.id, "comment deleted");
        Ok(DeleteAck::deleted())
    }

    async fn load_comment(&self, post_id: i64, comment_id: i64) -> Result<CommentRecord> {
        self.store
            .find_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {} not found", comment_id)))
    }

    async fn load_owned_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        user: &User,
    ) -> Result<CommentRecord> {
        let comment = self.load_comment(post_id, comment_id).await?;
        if let Err(err) = check_comment_ownership(user.id, &comment) {
            tracing::warn!(post_id, comment_id, user_id = user.id, "comment ownership check failed");
            return Err(err);
        }
        Ok(comment)
    }
}
