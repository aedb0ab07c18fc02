use crate::models::DbAdmin;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_admin<'e, E: PgExecutor<'e>>(
    executor: E,
    username: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<DbAdmin> {
    let id = Uuid::new_v4();

    tracing::debug!("Creating admin: id={}, username={}", id, username);

    let admin = sqlx::query_as::<_, DbAdmin>(
        r#"
        INSERT INTO admins (id, username, password_hash, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(admin)
}

pub async fn get_admin_by_username<'e, E: PgExecutor<'e>>(
    executor: E,
    username: &str,
) -> Result<Option<DbAdmin>> {
    let admin = sqlx::query_as::<_, DbAdmin>(
        r#"
        SELECT id, username, password_hash, created_at
        FROM admins
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(executor)
    .await?;

    Ok(admin)
}
