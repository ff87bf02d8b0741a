use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::crypto;
use crate::database::{now_timestamp, session_repo, user_repo};
use crate::error::{AppError, AppResult};
use crate::models::UsersRow;
use crate::services::parse_string_array_json;
use crate::services::policy::{authorize, Capability};

/// Public shape of a user. `password` is part of the wire format but is never
/// populated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub password: Option<String>,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub interests: Vec<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub connected_to_facebook: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UsersRow> for UserView {
    fn from(row: UsersRow) -> Self {
        Self {
            id: row.id,
            interests: parse_string_array_json(Some(&row.interests)),
            username: row.username,
            password: None,
            email: row.email,
            profile_image_url: row.profile_image_url,
            description: row.description,
            status: row.status,
            connected_to_facebook: row.connected_to_facebook == 1,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryView {
    pub id: i64,
    pub username: String,
    pub profile_image_url: Option<String>,
}

impl From<UsersRow> for UserSummaryView {
    fn from(row: UsersRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            profile_image_url: row.profile_image_url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub connected_to_facebook: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
    pub interests: Option<Vec<String>>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub connected_to_facebook: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub token: String,
    pub user_id: i64,
}

pub async fn signup(pool: &SqlitePool, password_cost: u32, input: SignupInput) -> AppResult<UserView> {
    let username = input.username.trim();
    let email = input.email.trim();
    if username.is_empty() || input.password.is_empty() || email.is_empty() {
        return Err(AppError::validation(
            "username, password and email are required",
        ));
    }

    if user_repo::load_user_by_username(pool, username).await?.is_some() {
        return Err(username_taken(username));
    }

    let password_hash = crypto::hash_password(&input.password, password_cost).await?;
    let interests_json = serde_json::to_string(&input.interests)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let now = now_timestamp();

    let user_id = user_repo::insert_user(
        pool,
        user_repo::NewUser {
            username,
            email,
            password_hash: &password_hash,
            profile_image_url: input.profile_image_url.as_deref(),
            description: input.description.as_deref(),
            status: input.status.as_deref(),
            connected_to_facebook: input.connected_to_facebook,
            interests_json: &interests_json,
            now: &now,
        },
    )
    .await
    .map_err(|e| map_unique_violation(e, username))?;

    info!(user_id, username, "User signed up");
    load_user(pool, user_id).await
}

/// Verifies credentials and opens a session. Any mismatch yields the same
/// error, and an unknown username still costs one bcrypt round at
/// `password_cost`, so neither the body nor the timing tells which field was
/// wrong.
pub async fn login(pool: &SqlitePool, password_cost: u32, input: LoginInput) -> AppResult<LoginOutcome> {
    let Some(user) = user_repo::load_user_by_username(pool, input.username.trim()).await? else {
        crypto::hash_password(&input.password, password_cost).await?;
        return Err(AppError::InvalidCredentials);
    };
    if !crypto::verify_password(&input.password, &user.password_hash).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = crypto::generate_token();
    session_repo::insert_session(pool, &token, user.id, &now_timestamp()).await?;
    info!(user_id = user.id, "User logged in");

    Ok(LoginOutcome {
        token,
        user_id: user.id,
    })
}

pub async fn logout(pool: &SqlitePool, token: &str) -> AppResult<()> {
    session_repo::delete_session(pool, token).await?;
    Ok(())
}

pub async fn load_user(pool: &SqlitePool, user_id: i64) -> AppResult<UserView> {
    user_repo::load_user_by_id(pool, user_id)
        .await?
        .map(UserView::from)
        .ok_or(AppError::NotFound("User"))
}

pub async fn update_user(
    pool: &SqlitePool,
    user_id: i64,
    caller_id: i64,
    input: UpdateUserInput,
) -> AppResult<UserView> {
    authorize(caller_id, Capability::SelfOf(user_id))?;

    let Some(row) = user_repo::load_user_by_id(pool, user_id).await? else {
        return Err(AppError::NotFound("User"));
    };

    let username = match input.username.as_deref().map(str::trim) {
        Some("") => return Err(AppError::validation("username cannot be empty")),
        Some(name) => name.to_string(),
        None => row.username.clone(),
    };
    if username != row.username {
        if let Some(other) = user_repo::load_user_by_username(pool, &username).await? {
            if other.id != row.id {
                return Err(username_taken(&username));
            }
        }
    }

    let email = match input.email.as_deref().map(str::trim) {
        Some("") => return Err(AppError::validation("email cannot be empty")),
        Some(email) => email.to_string(),
        None => row.email.clone(),
    };

    let interests_json = match input.interests {
        Some(list) => {
            serde_json::to_string(&list).map_err(|e| AppError::Internal(e.to_string()))?
        }
        None => row.interests.clone(),
    };

    let profile_image_url = input.profile_image_url.or(row.profile_image_url);
    let description = input.description.or(row.description);
    let status = input.status.or(row.status);
    let connected_to_facebook = input
        .connected_to_facebook
        .unwrap_or(row.connected_to_facebook == 1);
    let now = now_timestamp();

    user_repo::update_user(
        pool,
        user_repo::UserChanges {
            id: user_id,
            username: &username,
            email: &email,
            profile_image_url: profile_image_url.as_deref(),
            description: description.as_deref(),
            status: status.as_deref(),
            connected_to_facebook,
            interests_json: &interests_json,
            now: &now,
        },
    )
    .await
    .map_err(|e| map_unique_violation(e, &username))?;

    load_user(pool, user_id).await
}

fn username_taken(username: &str) -> AppError {
    AppError::Conflict(format!("username '{username}' is already taken"))
}

fn map_unique_violation(err: sqlx::Error, username: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => username_taken(username),
        _ => AppError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connect_in_memory, schema};
    use axum::http::StatusCode;

    async fn pool() -> SqlitePool {
        let pool = connect_in_memory().await.unwrap();
        schema::ensure_schema(&pool).await.unwrap();
        pool
    }

    fn signup_input(username: &str) -> SignupInput {
        SignupInput {
            username: username.to_string(),
            password: "password".to_string(),
            email: format!("{username}@test.com"),
            interests: vec!["tacos".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn signup_hides_password_and_keeps_interests() {
        let pool = pool().await;
        let user = signup(&pool, 4, signup_input("test")).await.unwrap();
        assert_eq!(user.username, "test");
        assert!(user.password.is_none());
        assert_eq!(user.interests, vec!["tacos".to_string()]);
        assert!(!user.created_at.is_empty());

        let row = user_repo::load_user_by_id(&pool, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(row.password_hash, "password");
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let pool = pool().await;
        signup(&pool, 4, signup_input("test")).await.unwrap();
        let err = signup(&pool, 4, signup_input("test")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn login_errors_are_indistinguishable() {
        let pool = pool().await;
        signup(&pool, 4, signup_input("test")).await.unwrap();

        let wrong_password = login(
            &pool,
            4,
            LoginInput {
                username: "test".into(),
                password: "nope".into(),
            },
        )
        .await
        .unwrap_err();
        let unknown_user = login(
            &pool,
            4,
            LoginInput {
                username: "brandon".into(),
                password: "password".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_username_pays_for_a_hash() {
        const COST: u32 = 10;
        let pool = pool().await;
        signup(&pool, COST, signup_input("test")).await.unwrap();

        let attempt = |username: &'static str| {
            let pool = pool.clone();
            async move {
                let started = std::time::Instant::now();
                let input = LoginInput {
                    username: username.into(),
                    password: "nope".into(),
                };
                let err = login(&pool, COST, input).await.unwrap_err();
                assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
                started.elapsed()
            }
        };

        let known = attempt("test").await;
        let unknown = attempt("brandon").await;
        assert!(
            unknown * 4 >= known,
            "unknown user answered in {unknown:?}, known in {known:?}"
        );
    }

    #[tokio::test]
    async fn logout_revokes_session() {
        let pool = pool().await;
        signup(&pool, 4, signup_input("test")).await.unwrap();
        let outcome = login(
            &pool,
            4,
            LoginInput {
                username: "test".into(),
                password: "password".into(),
            },
        )
        .await
        .unwrap();

        assert!(session_repo::load_session(&pool, &outcome.token)
            .await
            .unwrap()
            .is_some());
        logout(&pool, &outcome.token).await.unwrap();
        assert!(session_repo::load_session(&pool, &outcome.token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn only_owner_updates_profile() {
        let pool = pool().await;
        let owner = signup(&pool, 4, signup_input("owner")).await.unwrap();
        let other = signup(&pool, 4, signup_input("other")).await.unwrap();

        let err = update_user(&pool, owner.id, other.id, UpdateUserInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let updated = update_user(
            &pool,
            owner.id,
            owner.id,
            UpdateUserInput {
                status: Some("walking over".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status.as_deref(), Some("walking over"));
        assert_eq!(updated.username, "owner");
    }

    #[tokio::test]
    async fn rename_to_taken_username_conflicts() {
        let pool = pool().await;
        let owner = signup(&pool, 4, signup_input("owner")).await.unwrap();
        signup(&pool, 4, signup_input("other")).await.unwrap();

        let err = update_user(
            &pool,
            owner.id,
            owner.id,
            UpdateUserInput {
                username: Some("other".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
