use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use cookie::{Cookie, SameSite};
use serde_json::json;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::services::user_service::{self, LoginInput};
use crate::state::AppState;
use crate::web::extract::JsonBody;
use crate::web::middleware::auth::{AuthenticatedUser, ACCESS_TOKEN_COOKIE};

pub async fn login_handler(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> AppResult<Response> {
    let outcome = user_service::login(&state.pool, state.password_cost, input).await?;

    let mut access_cookie = Cookie::new(ACCESS_TOKEN_COOKIE, outcome.token.clone());
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(SameSite::Lax);

    let mut response = (StatusCode::OK, Json(outcome)).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, cookie_header(&access_cookie)?);
    Ok(response)
}

pub async fn logout_handler(
    State(pool): State<SqlitePool>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> AppResult<Response> {
    user_service::logout(&pool, &auth_user.token).await?;

    let mut access_cookie = Cookie::new(ACCESS_TOKEN_COOKIE, "");
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(SameSite::Lax);
    access_cookie.make_removal();

    let mut response = Json(json!({ "loggedOut": true })).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, cookie_header(&access_cookie)?);
    Ok(response)
}

fn cookie_header(cookie: &Cookie<'_>) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::Internal(format!("invalid cookie header: {e}")))
}
