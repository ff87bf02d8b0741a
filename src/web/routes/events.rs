use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::services::event_service::{self, CreateEventInput, UpdateEventInput};
use crate::services::geo;
use crate::web::extract::{JsonBody, PathParam};
use crate::web::middleware::auth::AuthenticatedUser;

// Kept as strings so malformed numbers become our own 400 body.
#[derive(Debug, Deserialize, Default)]
pub struct NearbyQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub radius: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveCommand {
    pub user: i64,
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusCommand {
    #[serde(default)]
    pub status: String,
}

pub async fn create_event_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    JsonBody(input): JsonBody<CreateEventInput>,
) -> AppResult<impl IntoResponse> {
    let event = event_service::create_event(&pool, auth_user.id, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn nearby_events_handler(
    State(pool): State<SqlitePool>,
    Query(query): Query<NearbyQuery>,
) -> AppResult<impl IntoResponse> {
    let (latitude, longitude) =
        geo::parse_coordinates(query.latitude.as_deref(), query.longitude.as_deref())?;
    let radius_km = match query.radius.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<f64>()
                .map_err(|_| AppError::validation("radius must be a number of kilometres"))?,
        ),
        None => None,
    };

    let events = event_service::list_nearby(&pool, latitude, longitude, radius_km).await?;
    Ok(Json(events))
}

pub async fn event_detail_handler(
    State(pool): State<SqlitePool>,
    PathParam(event_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let event = event_service::load_event_detail(&pool, event_id).await?;
    Ok(Json(event))
}

pub async fn update_event_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    PathParam(event_id): PathParam<i64>,
    JsonBody(input): JsonBody<UpdateEventInput>,
) -> AppResult<impl IntoResponse> {
    let event = event_service::update_event(&pool, event_id, auth_user.id, input).await?;
    Ok(Json(event))
}

pub async fn join_event_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    PathParam(event_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let membership = event_service::request_join(&pool, event_id, auth_user.id).await?;
    Ok(Json(membership))
}

pub async fn approve_member_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    PathParam(event_id): PathParam<i64>,
    JsonBody(cmd): JsonBody<ApproveCommand>,
) -> AppResult<impl IntoResponse> {
    let membership =
        event_service::set_approval(&pool, event_id, auth_user.id, cmd.user, cmd.approved)
            .await?;
    Ok(Json(membership))
}

pub async fn member_status_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    PathParam(event_id): PathParam<i64>,
    JsonBody(cmd): JsonBody<StatusCommand>,
) -> AppResult<impl IntoResponse> {
    let membership =
        event_service::update_status(&pool, event_id, auth_user.id, &cmd.status).await?;
    Ok(Json(membership))
}
