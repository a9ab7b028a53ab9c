//! In-memory collaborators for integration tests
//!
//! `MemoryStore` mirrors the PostgreSQL store closely enough to drive the
//! services without a database: ids are assigned in insertion order, every
//! write advances a fake clock, and deleting a comment that still has replies
//! is refused the way the foreign key refuses it.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use geopost_service::db::ContentStore;
use geopost_service::error::{AppError, Result};
use geopost_service::models::{
    Comment, CommentRecord, Like, NewComment, NewPost, Post, PostRecord, User,
};
use geopost_service::storage::ImageUploader;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct State {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    next_id: i64,
    ticks: i64,
    fail_listing: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap() + Duration::seconds(self.ticks)
    }

    fn user(&self, user_id: i64) -> Option<User> {
        self.users.iter().find(|u| u.id == user_id).cloned()
    }

    fn post_record(&self, post: &Post) -> Option<PostRecord> {
        self.user(post.user_id).map(|author| PostRecord {
            post: post.clone(),
            author,
        })
    }

    fn comment_record(&self, comment: &Comment) -> Option<CommentRecord> {
        self.user(comment.user_id).map(|author| CommentRecord {
            comment: comment.clone(),
            author,
        })
    }
}

/// Shared in-memory entity store
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, nick_name: &str) -> User {
        let mut state = self.state.lock().unwrap();
        let user = User {
            id: state.next_id(),
            login_type: "email".to_string(),
            email: format!("{}@example.com", nick_name),
            nick_name: nick_name.to_string(),
            image_uri: None,
        };
        state.users.push(user.clone());
        user
    }

    pub fn add_like(&self, post_id: i64, user_id: i64) {
        let mut state = self.state.lock().unwrap();
        let like = Like {
            id: state.next_id(),
            post_id,
            user_id,
            created_at: state.now(),
        };
        state.likes.push(like);
    }

    /// Store a comment row as is, bypassing service checks
    pub fn insert_raw_comment(&self, post_id: i64, user_id: i64, parent: Option<i64>) -> Comment {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let comment = Comment {
            id: state.next_id(),
            post_id,
            user_id,
            parent_comment_id: parent,
            content: "raw".to_string(),
            created_at: now,
            updated_at: now,
        };
        state.comments.push(comment.clone());
        comment
    }

    pub fn likes_for(&self, post_id: i64) -> usize {
        let state = self.state.lock().unwrap();
        state.likes.iter().filter(|l| l.post_id == post_id).count()
    }

    pub fn comments_for(&self, post_id: i64) -> usize {
        let state = self.state.lock().unwrap();
        state.comments.iter().filter(|c| c.post_id == post_id).count()
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts.len()
    }

    pub fn stored_post(&self, post_id: i64) -> Option<Post> {
        let state = self.state.lock().unwrap();
        state.posts.iter().find(|p| p.id == post_id).cloned()
    }

    pub fn stored_comment(&self, comment_id: i64) -> Option<Comment> {
        let state = self.state.lock().unwrap();
        state.comments.iter().find(|c| c.id == comment_id).cloned()
    }

    /// Make every post listing fail with a database error
    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_listing = true;
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.state.lock().unwrap().user(user_id))
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .and_then(|p| state.post_record(p)))
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>> {
        let state = self.state.lock().unwrap();
        if state.fail_listing {
            return Err(AppError::DatabaseError("connection reset".to_string()));
        }
        Ok(state
            .posts
            .iter()
            .rev()
            .filter_map(|p| state.post_record(p))
            .collect())
    }

    async fn insert_post(&self, new_post: NewPost) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let post = Post {
            id: state.next_id(),
            user_id: new_post.user_id,
            title: new_post.title,
            content: new_post.content,
            image_url: new_post.image_url,
            address: new_post.address,
            latitude: new_post.latitude,
            longitude: new_post.longitude,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn save_post(&self, post: &Post) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let stored = state
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post.id)))?;

        let changed = stored.title != post.title
            || stored.content != post.content
            || stored.image_url != post.image_url
            || stored.address != post.address
            || stored.latitude != post.latitude
            || stored.longitude != post.longitude;

        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.image_url = post.image_url.clone();
        stored.address = post.address.clone();
        stored.latitude = post.latitude;
        stored.longitude = post.longitude;
        if changed {
            stored.updated_at = now;
        }
        Ok(stored.clone())
    }

    async fn delete_post_cascade(&self, post_id: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::NotFound(format!("post {} not found", post_id)));
        }
        state.likes.retain(|l| l.post_id != post_id);
        state.comments.retain(|c| c.post_id != post_id);
        state.posts.retain(|p| p.id != post_id);
        Ok(())
    }

    async fn find_comment(&self, post_id: i64, comment_id: i64) -> Result<Option<CommentRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .iter()
            .find(|c| c.id == comment_id && c.post_id == post_id)
            .and_then(|c| state.comment_record(c)))
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| state.comment_record(c))
            .collect())
    }

    async fn list_replies(&self, parent_comment_id: i64) -> Result<Vec<CommentRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .iter()
            .filter(|c| c.parent_comment_id == Some(parent_comment_id))
            .filter_map(|c| state.comment_record(c))
            .collect())
    }

    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let comment = Comment {
            id: state.next_id(),
            post_id: new_comment.post_id,
            user_id: new_comment.user_id,
            parent_comment_id: new_comment.parent_comment_id,
            content: new_comment.content,
            created_at: now,
            updated_at: now,
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn save_comment(&self, comment: &Comment) -> Result<Comment> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let stored = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or_else(|| AppError::NotFound(format!("comment {} not found", comment.id)))?;

        if stored.content != comment.content {
            stored.content = comment.content.clone();
            stored.updated_at = now;
        }
        Ok(stored.clone())
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state
            .comments
            .iter()
            .any(|c| c.parent_comment_id == Some(comment_id))
        {
            return Err(AppError::Conflict(
                "comment still has replies".to_string(),
            ));
        }
        let before = state.comments.len();
        state.comments.retain(|c| c.id != comment_id);
        if state.comments.len() == before {
            return Err(AppError::NotFound(format!(
                "comment {} no longer exists",
                comment_id
            )));
        }
        Ok(())
    }
}

/// Uploader that records every call and returns a predictable URL
#[derive(Clone, Default)]
pub struct RecordingUploader {
    uploads: Arc<Mutex<Vec<(String, usize)>>>,
    failing: bool,
}

impl RecordingUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Filenames and byte counts received so far
    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageUploader for RecordingUploader {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        if self.failing {
            return Err(AppError::Upload("bucket unavailable".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((filename.to_string(), bytes.len()));
        Ok(format!("https://cdn.test/posts/{}-{}", uploads.len(), filename))
    }
}
