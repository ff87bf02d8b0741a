use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::services::geo;
use crate::services::location_service::{self, VenueQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct LocationSearchQuery {
    latitude: Option<String>,
    longitude: Option<String>,
    q: Option<String>,
    radius: Option<String>,
}

pub async fn search_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationSearchQuery>,
) -> AppResult<impl IntoResponse> {
    let (latitude, longitude) =
        geo::parse_coordinates(query.latitude.as_deref(), query.longitude.as_deref())?;
    let radius_m = match query.radius.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| AppError::validation("radius must be a whole number of metres"))?,
        ),
        None => None,
    };

    let venue_query = VenueQuery {
        latitude,
        longitude,
        search: query.q,
        radius_m,
    };
    let venues =
        location_service::search_venues(&state.http, &state.foursquare, &venue_query).await?;
    location_service::cache_venues(&state.pool, &venues).await;

    Ok(Json(json!({ "locations": venues })))
}
