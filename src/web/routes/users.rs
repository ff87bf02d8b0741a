use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::services::event_service;
use crate::services::review_service::{self, NewReviewInput};
use crate::services::user_service::{self, SignupInput, UpdateUserInput};
use crate::state::AppState;
use crate::web::extract::{JsonBody, PathParam};
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn signup_handler(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SignupInput>,
) -> AppResult<impl IntoResponse> {
    let user = user_service::signup(&state.pool, state.password_cost, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn user_profile_handler(
    State(pool): State<SqlitePool>,
    PathParam(user_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let user = user_service::load_user(&pool, user_id).await?;
    Ok(Json(user))
}

pub async fn update_user_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    PathParam(user_id): PathParam<i64>,
    JsonBody(input): JsonBody<UpdateUserInput>,
) -> AppResult<impl IntoResponse> {
    let user = user_service::update_user(&pool, user_id, auth_user.id, input).await?;
    Ok(Json(user))
}

pub async fn list_reviews_handler(
    State(pool): State<SqlitePool>,
    PathParam(user_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let reviews = review_service::list_reviews(&pool, user_id).await?;
    Ok(Json(reviews))
}

pub async fn post_review_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    PathParam(user_id): PathParam<i64>,
    JsonBody(input): JsonBody<NewReviewInput>,
) -> AppResult<impl IntoResponse> {
    let review = review_service::post_review(&pool, user_id, auth_user.id, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn history_handler(
    State(pool): State<SqlitePool>,
    PathParam(user_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let events = event_service::list_history(&pool, user_id).await?;
    Ok(Json(events))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCommand {
    pub event_id: i64,
}

pub async fn update_history_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    PathParam(user_id): PathParam<i64>,
    JsonBody(cmd): JsonBody<HistoryCommand>,
) -> AppResult<impl IntoResponse> {
    let event = event_service::complete_event(&pool, user_id, auth_user.id, cmd.event_id).await?;
    Ok(Json(event))
}
