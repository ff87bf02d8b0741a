use axum::{
    extract::{Query, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::Cookie;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::session_repo;
use crate::error::AppError;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub token: String,
}

#[derive(Deserialize)]
struct AccessTokenQuery {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

pub async fn require_auth(
    State(pool): State<SqlitePool>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return AppError::Unauthenticated.into_response();
    };

    match session_repo::load_session(&pool, &token).await {
        Ok(Some(session)) => {
            request.extensions_mut().insert(AuthenticatedUser {
                id: session.user_id,
                token: session.token,
            });
            next.run(request).await
        }
        Ok(None) => AppError::Unauthenticated.into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Token lookup order: bearer header, `accessToken` query parameter, cookie.
fn extract_token(request: &Request) -> Option<String> {
    let headers = request.headers();

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    let from_query = Query::<AccessTokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.access_token)
        .filter(|t| !t.is_empty());
    if from_query.is_some() {
        return from_query;
    }

    headers
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            Cookie::split_parse(cookies)
                .flatten()
                .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
                .map(|c| c.value().to_string())
                .filter(|t| !t.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn reads_bearer_header_first() {
        let req = request(
            "/events?accessToken=from-query",
            &[
                ("authorization", "Bearer from-header"),
                ("cookie", "access_token=from-cookie"),
            ],
        );
        assert_eq!(extract_token(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn falls_back_to_query_then_cookie() {
        let req = request("/events/1?accessToken=abc&latitude=1", &[]);
        assert_eq!(extract_token(&req).as_deref(), Some("abc"));

        let req = request("/events/1", &[("cookie", "theme=dark; access_token=xyz")]);
        assert_eq!(extract_token(&req).as_deref(), Some("xyz"));
    }

    #[test]
    fn cookie_lookup_skips_malformed_and_lookalike_pairs() {
        let req = request(
            "/events/1",
            &[("cookie", "garbage; access_token_old=stale; access_token=xyz")],
        );
        assert_eq!(extract_token(&req).as_deref(), Some("xyz"));
    }

    #[test]
    fn no_token_anywhere() {
        let req = request("/events", &[("cookie", "access_token=")]);
        assert_eq!(extract_token(&req), None);
    }
}
