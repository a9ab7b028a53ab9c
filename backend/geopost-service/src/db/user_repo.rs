use crate::models::User;
use sqlx::PgExecutor;

/// Find a user by ID
pub async fn find_user_by_id<'e, E>(executor: E, user_id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, login_type, email, nick_name, image_uri
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}
