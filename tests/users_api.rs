mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::test_app;

#[tokio::test]
async fn signup_returns_the_stored_user_without_password() {
    let app = test_app().await;

    let (status, created) = app
        .send(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({
                "username": "alice",
                "password": "hunter22",
                "email": "alice@example.com",
                "interests": ["climbing"],
                "description": "hi"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "alice");
    assert_eq!(created["interests"], json!(["climbing"]));
    assert!(created["password"].is_null());

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = app.get(&format!("/user/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, via_alias) = app.get(&format!("/users/{id}")).await;
    assert_eq!(via_alias, created);
}

#[tokio::test]
async fn signup_rejects_missing_fields_and_taken_usernames() {
    let app = test_app().await;
    app.signup("bob").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({ "username": "carol" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({ "username": "bob", "password": "x", "email": "b@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = test_app().await;
    let (status, body) = app.get("/user/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_errors_do_not_reveal_which_field_was_wrong() {
    let app = test_app().await;
    let id = app.signup("dave").await;

    let (wrong_pw, wrong_pw_body) = app
        .send(
            Method::POST,
            "/users/login",
            None,
            Some(json!({ "username": "dave", "password": "nope" })),
        )
        .await;
    let (unknown, unknown_body) = app
        .send(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "username": "nobody", "password": "hunter22" })),
        )
        .await;
    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body, unknown_body);

    let (status, body) = app
        .send(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "username": "dave", "password": "hunter22" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], id);
    assert_eq!(body["token"].as_str().unwrap().len(), 43);
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let app = test_app().await;
    let (id, token) = app.signup_and_login("erin").await;

    let (status, _) = app.send(Method::GET, "/user/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/user/{id}"),
            Some(&token),
            Some(json!({ "description": "still here?" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_is_accepted_from_query_parameter() {
    let app = test_app().await;
    let (id, token) = app.signup_and_login("fay").await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/users/{id}?accessToken={token}"),
            None,
            Some(json!({ "status": "around" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "around");
}

#[tokio::test]
async fn profile_updates_are_limited_to_the_owner() {
    let app = test_app().await;
    let (gina, gina_token) = app.signup_and_login("gina").await;
    let hank = app.signup("hank").await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/user/{gina}"),
            None,
            Some(json!({ "description": "anon" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/user/{hank}"),
            Some(&gina_token),
            Some(json!({ "description": "hacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/user/{gina}"),
            Some(&gina_token),
            Some(json!({ "description": "likes tea", "interests": ["tea"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "likes tea");
    assert_eq!(body["interests"], json!(["tea"]));
    assert_eq!(body["username"], "gina");

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/user/{gina}"),
            Some(&gina_token),
            Some(json!({ "username": "hank" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reviews_are_validated_and_listed_newest_first() {
    let app = test_app().await;
    let (ivy, ivy_token) = app.signup_and_login("ivy").await;
    let jack = app.signup("jack").await;
    let uri = format!("/users/{jack}/reviews");

    let (status, _) = app
        .send(Method::POST, &uri, Some(&ivy_token), Some(json!({ "starRating": 6 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/users/{ivy}/reviews"),
            Some(&ivy_token),
            Some(json!({ "starRating": 5, "text": "great" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for (stars, text) in [(3, "ok"), (5, "great host")] {
        let (status, body) = app
            .send(
                Method::POST,
                &uri,
                Some(&ivy_token),
                Some(json!({ "starRating": stars, "text": text })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["authorId"], ivy);
        assert_eq!(body["userId"], jack);
    }

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["text"], "great host");
    assert_eq!(reviews[1]["starRating"], 3);

    let (status, _) = app.get("/users/424242/reviews").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completing_an_event_moves_it_into_history() {
    let app = test_app().await;
    let (kim, kim_token) = app.signup_and_login("kim").await;
    let (leo, leo_token) = app.signup_and_login("leo").await;
    let location_id = app.seed_location("4b0587e3f964a520d5ba22e3", 52.37, 4.89).await;
    let event_id = app.create_event(&kim_token, kim, location_id).await;

    let (status, body) = app.get(&format!("/users/{kim}/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Only the host may complete, and only through their own history.
    let (status, _) = app
        .send(
            Method::POST,
            &format!("/users/{leo}/history"),
            Some(&leo_token),
            Some(json!({ "eventId": event_id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/users/{leo}/history"),
            Some(&kim_token),
            Some(json!({ "eventId": event_id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/users/{kim}/history"),
            Some(&kim_token),
            Some(json!({ "eventId": event_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completedStatus"], true);

    let (status, body) = app.get(&format!("/users/{kim}/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], event_id);

    // Not a member of the event, so nothing shows up for leo.
    let (_, body) = app.get(&format!("/users/{leo}/history")).await;
    assert_eq!(body, json!([]));
}
