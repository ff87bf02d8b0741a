use sqlx::SqlitePool;

use crate::models::SessionsRow;

const SQL_INSERT_SESSION: &str = r#"
INSERT INTO sessions (token, user_id, created_at)
VALUES (?1, ?2, ?3)
"#;

pub async fn insert_session(
    pool: &SqlitePool,
    token: &str,
    user_id: i64,
    now: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_SESSION)
        .bind(token)
        .bind(user_id)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LOAD_SESSION: &str = r#"
SELECT token, user_id, created_at
FROM sessions
WHERE token = ?1
LIMIT 1
"#;

pub async fn load_session(pool: &SqlitePool, token: &str) -> sqlx::Result<Option<SessionsRow>> {
    sqlx::query_as::<_, SessionsRow>(SQL_LOAD_SESSION)
        .bind(token)
        .fetch_optional(pool)
        .await
}

const SQL_DELETE_SESSION: &str = r#"
DELETE FROM sessions
WHERE token = ?1
"#;

pub async fn delete_session(pool: &SqlitePool, token: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SESSION)
        .bind(token)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
