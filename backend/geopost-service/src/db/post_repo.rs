use crate::models::{NewPost, Post, PostRecord, User};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

/// Post row joined with its author's columns
#[derive(Debug, sqlx::FromRow)]
struct PostAuthorRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    image_url: String,
    address: String,
    latitude: f64,
    longitude: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_login_type: String,
    author_email: String,
    author_nick_name: String,
    author_image_uri: Option<String>,
}

impl From<PostAuthorRow> for PostRecord {
    fn from(row: PostAuthorRow) -> Self {
        PostRecord {
            author: User {
                id: row.user_id,
                login_type: row.author_login_type,
                email: row.author_email,
                nick_name: row.author_nick_name,
                image_uri: row.author_image_uri,
            },
            post: Post {
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                content: row.content,
                image_url: row.image_url,
                address: row.address,
                latitude: row.latitude,
                longitude: row.longitude,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const SELECT_POST_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.user_id, p.title, p.content, p.image_url, p.address,
           p.latitude, p.longitude, p.created_at, p.updated_at,
           u.login_type AS author_login_type, u.email AS author_email,
           u.nick_name AS author_nick_name, u.image_uri AS author_image_uri
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

/// Create a new post
pub async fn create_post<'e, E>(executor: E, new_post: &NewPost) -> Result<Post, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, title, content, image_url, address, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, title, content, image_url, address, latitude, longitude,
                  created_at, updated_at
        "#,
    )
    .bind(new_post.user_id)
    .bind(&new_post.title)
    .bind(&new_post.content)
    .bind(&new_post.image_url)
    .bind(&new_post.address)
    .bind(new_post.latitude)
    .bind(new_post.longitude)
    .fetch_one(executor)
    .await?;

    Ok(post)
}

/// Find a post by ID together with its author
pub async fn find_post_with_author<'e, E>(
    executor: E,
    post_id: i64,
) -> Result<Option<PostRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("{} WHERE p.id = $1", SELECT_POST_WITH_AUTHOR);
    let row = sqlx::query_as::<_, PostAuthorRow>(&query)
        .bind(post_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(PostRecord::from))
}

/// List all posts with their authors, newest first
pub async fn list_posts_with_author<'e, E>(executor: E) -> Result<Vec<PostRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "{} ORDER BY p.created_at DESC, p.id DESC",
        SELECT_POST_WITH_AUTHOR
    );
    let rows = sqlx::query_as::<_, PostAuthorRow>(&query)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(PostRecord::from).collect())
}

/// Persist the mutable fields of a post
/// `updated_at` only moves when a field actually changed; `None` when the row is gone
pub async fn update_post<'e, E>(executor: E, post: &Post) -> Result<Option<Post>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let updated = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $2,
            content = $3,
            image_url = $4,
            address = $5,
            latitude = $6,
            longitude = $7,
            updated_at = CASE
                WHEN (title, content, image_url, address, latitude, longitude)
                     IS DISTINCT FROM ($2, $3, $4, $5, $6, $7)
                THEN NOW()
                ELSE updated_at
            END
        WHERE id = $1
        RETURNING id, user_id, title, content, image_url, address, latitude, longitude,
                  created_at, updated_at
        "#,
    )
    .bind(post.id)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.image_url)
    .bind(&post.address)
    .bind(post.latitude)
    .bind(post.longitude)
    .fetch_optional(executor)
    .await?;

    Ok(updated)
}

/// Hard delete a post row
pub async fn delete_post<'e, E>(executor: E, post_id: i64) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
