use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{EventMemberProfileRow, EventMembersRow};

// Idempotent per (event, user): a repeated join leaves the existing row untouched.
const SQL_INSERT_MEMBER_IF_ABSENT: &str = r#"
INSERT INTO event_members (
  event_id,
  user_id,
  approved,
  status,
  created_at,
  updated_at
) VALUES (?1, ?2, ?3, '', ?4, ?4)
ON CONFLICT(event_id, user_id) DO NOTHING
"#;

pub async fn insert_member_if_absent<'e, E>(
    executor: E,
    event_id: i64,
    user_id: i64,
    approved: bool,
    now: &str,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_MEMBER_IF_ABSENT)
        .bind(event_id)
        .bind(user_id)
        .bind(i64::from(approved))
        .bind(now)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_MEMBER: &str = r#"
SELECT
  event_id,
  user_id,
  approved,
  status,
  created_at,
  updated_at
FROM event_members
WHERE event_id = ?1
  AND user_id = ?2
LIMIT 1
"#;

pub async fn load_member<'e, E>(
    executor: E,
    event_id: i64,
    user_id: i64,
) -> sqlx::Result<Option<EventMembersRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EventMembersRow>(SQL_LOAD_MEMBER)
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

// Only flips the flag; a row already holding the target value is untouched.
const SQL_SET_APPROVED: &str = r#"
UPDATE event_members
SET approved = ?1,
    updated_at = ?2
WHERE event_id = ?3
  AND user_id = ?4
  AND approved <> ?1
"#;

pub async fn set_approved<'e, E>(
    executor: E,
    event_id: i64,
    user_id: i64,
    approved: bool,
    now: &str,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_SET_APPROVED)
        .bind(i64::from(approved))
        .bind(now)
        .bind(event_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SET_STATUS: &str = r#"
UPDATE event_members
SET status = ?1,
    updated_at = ?2
WHERE event_id = ?3
  AND user_id = ?4
"#;

pub async fn set_status(
    pool: &SqlitePool,
    event_id: i64,
    user_id: i64,
    status: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_STATUS)
        .bind(status)
        .bind(now)
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_MEMBER_PROFILES: &str = r#"
SELECT
  m.user_id,
  u.username,
  u.profile_image_url,
  m.approved,
  m.status
FROM event_members m
JOIN users u
  ON u.id = m.user_id
WHERE m.event_id = ?1
ORDER BY m.created_at ASC, m.user_id ASC
"#;

pub async fn list_member_profiles(
    pool: &SqlitePool,
    event_id: i64,
) -> sqlx::Result<Vec<EventMemberProfileRow>> {
    sqlx::query_as::<_, EventMemberProfileRow>(SQL_LIST_MEMBER_PROFILES)
        .bind(event_id)
        .fetch_all(pool)
        .await
}
