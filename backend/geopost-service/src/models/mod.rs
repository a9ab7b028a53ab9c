/// Data models for geopost-service
///
/// This module defines structures for:
/// - User: Read-only author identity
/// - Post: Location-tagged posts with an image
/// - Comment: Threaded comments on posts
/// - Like: User/post join rows
///
/// Response shapes live in [`responses`].
pub mod responses;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use responses::{
    AuthorSummary, CommentResponse, DeleteAck, MarkerAuthor, MarkerResponse, PostResponse,
};

/// User entity, owned by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub login_type: String,
    pub email: String,
    pub nick_name: String,
    pub image_uri: Option<String>,
}

/// Post entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment entity - a reply when `parent_comment_id` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub parent_comment_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Like entity - existence means the user liked the post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A post loaded together with its author
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub post: Post,
    pub author: User,
}

/// A comment loaded together with its author
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub comment: Comment,
    pub author: User,
}

/// Fields for a post about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Fields for a comment about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub parent_comment_id: Option<i64>,
    pub content: String,
}
