//! External response shapes.
//!
//! Every mapping here is a pure function from stored records to a freshly
//! allocated response value.

use super::{CommentRecord, PostRecord, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Author summary attached to posts and comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: i64,
    pub login_type: String,
    pub email: String,
    pub nick_name: String,
    pub image_uri: Option<String>,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login_type: user.login_type.clone(),
            email: user.email.clone(),
            nick_name: user.nick_name.clone(),
            image_uri: user.image_uri.clone(),
        }
    }
}

/// Full post detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorSummary,
}

impl From<&PostRecord> for PostResponse {
    fn from(record: &PostRecord) -> Self {
        let post = &record.post;
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            address: post.address.clone(),
            latitude: post.latitude,
            longitude: post.longitude,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author: AuthorSummary::from(&record.author),
        }
    }
}

/// Author as shown on a map pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkerAuthor {
    pub id: i64,
    pub nick_name: String,
}

/// Reduced post projection for map rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkerResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub author: MarkerAuthor,
}

impl From<&PostRecord> for MarkerResponse {
    fn from(record: &PostRecord) -> Self {
        let post = &record.post;
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            address: post.address.clone(),
            latitude: post.latitude,
            longitude: post.longitude,
            author: MarkerAuthor {
                id: record.author.id,
                nick_name: record.author.nick_name.clone(),
            },
        }
    }
}

/// Comment with its nested replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorSummary,
    #[schema(no_recursion)]
    pub replies: Vec<CommentResponse>,
}

impl CommentResponse {
    /// Format a comment with the given, already formatted, replies
    pub fn with_replies(record: &CommentRecord, replies: Vec<CommentResponse>) -> Self {
        let comment = &record.comment;
        Self {
            id: comment.id,
            content: comment.content.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            author: AuthorSummary::from(&record.author),
            replies,
        }
    }

    /// Format a comment with no replies attached
    pub fn leaf(record: &CommentRecord) -> Self {
        Self::with_replies(record, Vec::new())
    }

    /// Number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.replies.iter());
        }
        count
    }
}

/// Acknowledgement returned by delete operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteAck {
    pub deleted: bool,
}

impl DeleteAck {
    pub fn deleted() -> Self {
        Self { deleted: true }
    }
}
