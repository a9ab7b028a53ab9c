use crate::models::{Comment, CommentRecord, NewComment, User};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

/// Comment row joined with its author's columns
#[derive(Debug, sqlx::FromRow)]
struct CommentAuthorRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    parent_comment_id: Option<i64>,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_login_type: String,
    author_email: String,
    author_nick_name: String,
    author_image_uri: Option<String>,
}

impl From<CommentAuthorRow> for CommentRecord {
    fn from(row: CommentAuthorRow) -> Self {
        CommentRecord {
            author: User {
                id: row.user_id,
                login_type: row.author_login_type,
                email: row.author_email,
                nick_name: row.author_nick_name,
                image_uri: row.author_image_uri,
            },
            comment: Comment {
                id: row.id,
                post_id: row.post_id,
                user_id: row.user_id,
                parent_comment_id: row.parent_comment_id,
                content: row.content,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const SELECT_COMMENT_WITH_AUTHOR: &str = r#"
    SELECT c.id, c.post_id, c.user_id, c.parent_comment_id, c.content,
           c.created_at, c.updated_at,
           u.login_type AS author_login_type, u.email AS author_email,
           u.nick_name AS author_nick_name, u.image_uri AS author_image_uri
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

/// Create a new comment on a post
pub async fn create_comment<'e, E>(
    executor: E,
    new_comment: &NewComment,
) -> Result<Comment, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, user_id, parent_comment_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, post_id, user_id, parent_comment_id, content, created_at, updated_at
        "#,
    )
    .bind(new_comment.post_id)
    .bind(new_comment.user_id)
    .bind(new_comment.parent_comment_id)
    .bind(&new_comment.content)
    .fetch_one(executor)
    .await?;

    Ok(comment)
}

/// Get a single comment scoped to its post
pub async fn find_comment_in_post<'e, E>(
    executor: E,
    post_id: i64,
    comment_id: i64,
) -> Result<Option<CommentRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "{} WHERE c.id = $1 AND c.post_id = $2",
        SELECT_COMMENT_WITH_AUTHOR
    );
    let row = sqlx::query_as::<_, CommentAuthorRow>(&query)
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(CommentRecord::from))
}

/// Get all comments for a post in ascending creation order
pub async fn get_comments_by_post<'e, E>(
    executor: E,
    post_id: i64,
) -> Result<Vec<CommentRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "{} WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC",
        SELECT_COMMENT_WITH_AUTHOR
    );
    let rows = sqlx::query_as::<_, CommentAuthorRow>(&query)
        .bind(post_id)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(CommentRecord::from).collect())
}

/// Get direct replies to a comment in ascending creation order
pub async fn get_comment_replies<'e, E>(
    executor: E,
    parent_comment_id: i64,
) -> Result<Vec<CommentRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "{} WHERE c.parent_comment_id = $1 ORDER BY c.created_at ASC, c.id ASC",
        SELECT_COMMENT_WITH_AUTHOR
    );
    let rows = sqlx::query_as::<_, CommentAuthorRow>(&query)
        .bind(parent_comment_id)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(CommentRecord::from).collect())
}

/// Update comment content
/// `updated_at` only moves when the content actually changed; `None` when the row is gone
pub async fn update_comment<'e, E>(
    executor: E,
    comment: &Comment,
) -> Result<Option<Comment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let updated = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET content = $2,
            updated_at = CASE WHEN content IS DISTINCT FROM $2 THEN NOW() ELSE updated_at END
        WHERE id = $1
        RETURNING id, post_id, user_id, parent_comment_id, content, created_at, updated_at
        "#,
    )
    .bind(comment.id)
    .bind(&comment.content)
    .fetch_optional(executor)
    .await?;

    Ok(updated)
}

/// Hard delete a single comment
pub async fn delete_comment<'e, E>(executor: E, comment_id: i64) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Delete every comment on a post, replies included
pub async fn delete_comments_by_post<'e, E>(executor: E, post_id: i64) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM comments WHERE post_id = $1")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
