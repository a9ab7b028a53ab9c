/// Database access layer
///
/// This module provides:
/// - The `ContentStore` contract the services are written against
/// - A PostgreSQL implementation backed by per-table repositories
/// - Connection pooling and embedded migrations
pub mod comment_repo;
pub mod like_repo;
pub mod post_repo;
pub mod user_repo;

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentRecord, NewComment, NewPost, Post, PostRecord, User};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Transactional CRUD over users, posts, comments and likes.
///
/// Relations are loaded eagerly: post and comment lookups always carry the
/// author, and comment listings come back in ascending creation order.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_post(&self, post_id: i64) -> Result<Option<PostRecord>>;

    async fn list_posts(&self) -> Result<Vec<PostRecord>>;

    async fn insert_post(&self, new_post: NewPost) -> Result<Post>;

    async fn save_post(&self, post: &Post) -> Result<Post>;

    /// Remove likes, then comments, then the post itself as one unit.
    async fn delete_post_cascade(&self, post_id: i64) -> Result<()>;

    /// Look up a comment only within the given post.
    async fn find_comment(&self, post_id: i64, comment_id: i64) -> Result<Option<CommentRecord>>;

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRecord>>;

    async fn list_replies(&self, parent_comment_id: i64) -> Result<Vec<CommentRecord>>;

    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment>;

    async fn save_comment(&self, comment: &Comment) -> Result<Comment>;

    async fn delete_comment(&self, comment_id: i64) -> Result<()>;
}

/// PostgreSQL-backed content store
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(user_repo::find_user_by_id(&self.pool, user_id).await?)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostRecord>> {
        Ok(post_repo::find_post_with_author(&self.pool, post_id).await?)
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>> {
        Ok(post_repo::list_posts_with_author(&self.pool).await?)
    }

    async fn insert_post(&self, new_post: NewPost) -> Result<Post> {
        Ok(post_repo::create_post(&self.pool, &new_post).await?)
    }

    async fn save_post(&self, post: &Post) -> Result<Post> {
        post_repo::update_post(&self.pool, post)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} no longer exists", post.id)))
    }

    async fn delete_post_cascade(&self, post_id: i64) -> Result<()> {
        // Dependents first; a failure anywhere rolls back the whole delete
        let mut tx = self.pool.begin().await?;

        let likes = like_repo::delete_likes_by_post(&mut *tx, post_id).await?;
        let comments = comment_repo::delete_comments_by_post(&mut *tx, post_id).await?;
        let posts = post_repo::delete_post(&mut *tx, post_id).await?;

        if posts == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("post {} no longer exists", post_id)));
        }

        tx.commit().await?;

        tracing::debug!(post_id, likes, comments, "post cascade delete committed");
        Ok(())
    }

    async fn find_comment(&self, post_id: i64, comment_id: i64) -> Result<Option<CommentRecord>> {
        Ok(comment_repo::find_comment_in_post(&self.pool, post_id, comment_id).await?)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRecord>> {
        Ok(comment_repo::get_comments_by_post(&self.pool, post_id).await?)
    }

    async fn list_replies(&self, parent_comment_id: i64) -> Result<Vec<CommentRecord>> {
        Ok(comment_repo::get_comment_replies(&self.pool, parent_comment_id).await?)
    }

    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment> {
        Ok(comment_repo::create_comment(&self.pool, &new_comment).await?)
    }

    async fn save_comment(&self, comment: &Comment) -> Result<Comment> {
        comment_repo::update_comment(&self.pool, comment)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {} no longer exists", comment.id)))
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        let deleted = match comment_repo::delete_comment(&self.pool, comment_id)
            .await
            .map_err(AppError::from)
        {
            Ok(rows) => rows,
            // Replies reference the row through parent_comment_id
            Err(AppError::Conflict(_)) => {
                return Err(AppError::Conflict("comment still has replies".to_string()))
            }
            Err(err) => return Err(err),
        };

        if deleted == 0 {
            return Err(AppError::NotFound(format!("comment {} no longer exists", comment_id)));
        }
        Ok(())
    }
}

/// Create the PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;

    Ok(pool)
}

/// Apply embedded migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("migration failed: {}", e)))
}
