use sqlx::PgExecutor;

/// Delete every like referencing a post
/// Returns the number of removed rows
pub async fn delete_likes_by_post<'e, E>(executor: E, post_id: i64) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM likes WHERE post_id = $1")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
