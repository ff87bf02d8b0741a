#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use partyof4::config::FoursquareConfig;
use partyof4::database::{self, location_repo, schema};
use partyof4::state::AppState;
use partyof4::web::build_router;

pub const TEST_PASSWORD_COST: u32 = 4;

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

pub async fn test_app() -> TestApp {
    test_app_with_foursquare(FoursquareConfig::default()).await
}

pub async fn test_app_with_foursquare(foursquare: FoursquareConfig) -> TestApp {
    let pool = database::connect_in_memory().await.unwrap();
    schema::ensure_schema(&pool).await.unwrap();
    let state = AppState::new(pool.clone(), foursquare, TEST_PASSWORD_COST).unwrap();

    TestApp {
        router: build_router(state),
        pool,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    /// Signs up and returns the new user's id.
    pub async fn signup(&self, username: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/users/signup",
                None,
                Some(json!({
                    "username": username,
                    "password": "hunter22",
                    "email": format!("{username}@example.com"),
                    "interests": ["board games", "hiking"]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["id"].as_i64().unwrap()
    }

    /// Logs in with the password `signup` uses and returns the token.
    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/user/login",
                None,
                Some(json!({ "username": username, "password": "hunter22" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn signup_and_login(&self, username: &str) -> (i64, String) {
        let id = self.signup(username).await;
        let token = self.login(username).await;
        (id, token)
    }

    pub async fn seed_location(&self, four_square_id: &str, latitude: f64, longitude: f64) -> i64 {
        location_repo::insert_location_if_absent(
            &self.pool,
            location_repo::NewLocation {
                four_square_id,
                name: "Cafe Central",
                street: Some("Main St 1"),
                city: Some("Amsterdam"),
                country: Some("Netherlands"),
                price: 2,
                latitude,
                longitude,
                tags_json: r#"["Cafe"]"#,
                now: "2015-09-01T10:00:00.000Z",
            },
        )
        .await
        .unwrap();

        location_repo::load_location_by_foursquare_id(&self.pool, four_square_id)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    /// Creates an event hosted by `host_id` and returns its id.
    pub async fn create_event(&self, token: &str, host_id: i64, location_id: i64) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/events",
                Some(token),
                Some(json!({
                    "hostId": host_id,
                    "locationId": location_id,
                    "plannedTime": "2015-09-03T02:30:00.000Z",
                    "capacity": 4,
                    "currentActivity": "coffee"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create event failed: {body}");
        body["id"].as_i64().unwrap()
    }
}
