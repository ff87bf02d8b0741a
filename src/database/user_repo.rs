use sqlx::SqlitePool;

use crate::models::UsersRow;

const SQL_USER_COLUMNS: &str = r#"
    id,
    username,
    email,
    password_hash,
    profile_image_url,
    description,
    status,
    connected_to_facebook,
    interests,
    created_at,
    updated_at
"#;

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub profile_image_url: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: Option<&'a str>,
    pub connected_to_facebook: bool,
    pub interests_json: &'a str,
    pub now: &'a str,
}

pub struct UserChanges<'a> {
    pub id: i64,
    pub username: &'a str,
    pub email: &'a str,
    pub profile_image_url: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: Option<&'a str>,
    pub connected_to_facebook: bool,
    pub interests_json: &'a str,
    pub now: &'a str,
}

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  username,
  email,
  password_hash,
  profile_image_url,
  description,
  status,
  connected_to_facebook,
  interests,
  created_at,
  updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
"#;

pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_USER)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.profile_image_url)
        .bind(user.description)
        .bind(user.status)
        .bind(i64::from(user.connected_to_facebook))
        .bind(user.interests_json)
        .bind(user.now)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}

pub async fn load_user_by_id(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Option<UsersRow>> {
    let sql = format!("SELECT {SQL_USER_COLUMNS} FROM users WHERE id = ?1 LIMIT 1");
    sqlx::query_as::<_, UsersRow>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn load_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> sqlx::Result<Option<UsersRow>> {
    let sql = format!("SELECT {SQL_USER_COLUMNS} FROM users WHERE username = ?1 LIMIT 1");
    sqlx::query_as::<_, UsersRow>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
}

const SQL_UPDATE_USER: &str = r#"
UPDATE users
SET username = ?1,
    email = ?2,
    profile_image_url = ?3,
    description = ?4,
    status = ?5,
    connected_to_facebook = ?6,
    interests = ?7,
    updated_at = ?8
WHERE id = ?9
"#;

pub async fn update_user(pool: &SqlitePool, changes: UserChanges<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_USER)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.profile_image_url)
        .bind(changes.description)
        .bind(changes.status)
        .bind(i64::from(changes.connected_to_facebook))
        .bind(changes.interests_json)
        .bind(changes.now)
        .bind(changes.id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
