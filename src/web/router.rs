use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::web::middleware::auth as auth_middleware;
use crate::web::routes::{auth, events, health, locations, users};

pub fn build_router(state: AppState) -> Router {
    // Protected routes share one auth layer. `route_layer` keeps
    // unmatched paths at 404 instead of 401.
    let protected_routes = Router::new()
        .route("/user/logout", get(auth::logout_handler))
        .route("/user/:user_id", post(users::update_user_handler))
        .route("/users/:user_id", post(users::update_user_handler))
        .route("/users/:user_id/reviews", post(users::post_review_handler))
        .route("/users/:user_id/history", post(users::update_history_handler))
        .route("/events", post(events::create_event_handler))
        .route("/events/:event_id", put(events::update_event_handler))
        .route("/events/:event_id/join", post(events::join_event_handler))
        .route("/events/:event_id/approve", put(events::approve_member_handler))
        .route("/events/:event_id/status", put(events::member_status_handler))
        .route_layer(middleware::from_fn_with_state(
            state.pool.clone(),
            auth_middleware::require_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(health::health_handler))
        .route("/users/signup", post(users::signup_handler))
        .route("/user/login", post(auth::login_handler))
        .route("/users/login", post(auth::login_handler))
        .route("/user/:user_id", get(users::user_profile_handler))
        .route("/users/:user_id", get(users::user_profile_handler))
        .route("/users/:user_id/reviews", get(users::list_reviews_handler))
        .route("/users/:user_id/history", get(users::history_handler))
        .route("/events", get(events::nearby_events_handler))
        .route("/events/:event_id", get(events::event_detail_handler))
        .route("/locations", get(locations::search_locations));

    // Same path with different methods merges into one method router; the
    // public side goes last so its 405 fallback is the one that stays.
    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
