use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::config::FoursquareConfig;
use crate::database::{location_repo, now_timestamp};
use crate::error::{AppError, AppResult};
use crate::models::LocationsRow;
use crate::services::parse_string_array_json;

const API_VERSION: &str = "20150903";
const SEARCH_RADIUS_M: u32 = 2000;
const BROWSE_RADIUS_M: u32 = 1000;
const BROWSE_LIMIT: &str = "50";
const MAX_RADIUS_M: u32 = 100_000;

/// A stored venue as served inside event payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    pub id: i64,
    pub four_square_id: String,
    pub name: String,
    pub address: AddressView,
    pub price: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressView {
    pub street: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl From<LocationsRow> for LocationView {
    fn from(row: LocationsRow) -> Self {
        Self {
            id: row.id,
            tags: parse_string_array_json(Some(&row.tags)),
            four_square_id: row.four_square_id,
            name: row.name,
            address: AddressView {
                street: row.street,
                city: row.city,
                country: row.country,
            },
            price: row.price,
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
        }
    }
}

/// A venue as returned by `GET /locations`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VenueResult {
    pub location_id: String,
    pub name: String,
    pub location: Vec<String>,
    pub distance: Option<f64>,
    pub price: i64,
    pub tags: Vec<String>,
    pub coords: Coords,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Coords {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct VenueQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub search: Option<String>,
    pub radius_m: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    response: Option<ExploreBody>,
}

#[derive(Debug, Deserialize)]
struct ExploreBody {
    groups: Option<Vec<ExploreGroup>>,
}

#[derive(Debug, Deserialize)]
struct ExploreGroup {
    items: Option<Vec<ExploreItem>>,
}

#[derive(Debug, Deserialize)]
struct ExploreItem {
    venue: Option<Venue>,
}

#[derive(Debug, Deserialize)]
struct Venue {
    id: Option<String>,
    name: Option<String>,
    location: Option<VenueLocation>,
    price: Option<VenuePrice>,
    categories: Option<Vec<VenueCategory>>,
}

#[derive(Debug, Deserialize)]
struct VenueLocation {
    lat: Option<f64>,
    lng: Option<f64>,
    distance: Option<f64>,
    #[serde(rename = "formattedAddress")]
    formatted_address: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct VenuePrice {
    tier: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct VenueCategory {
    name: Option<String>,
}

/// Query parameters for the explore endpoint. A search term switches from
/// browsing nearby food to a keyword search with a wider default radius.
pub fn build_explore_params(config: &FoursquareConfig, query: &VenueQuery) -> Vec<(&'static str, String)> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let default_radius = if search.is_some() {
        SEARCH_RADIUS_M
    } else {
        BROWSE_RADIUS_M
    };
    let radius = query
        .radius_m
        .unwrap_or(default_radius)
        .clamp(1, MAX_RADIUS_M);

    let mut params = vec![
        ("client_id", config.client_id.clone()),
        ("client_secret", config.client_secret.clone()),
        ("ll", format!("{},{}", query.latitude, query.longitude)),
        ("v", API_VERSION.to_string()),
        ("radius", radius.to_string()),
        ("openNow", "1".to_string()),
    ];

    match search {
        Some(term) => params.push(("query", term.to_string())),
        None => {
            params.push(("section", "food".to_string()));
            params.push(("limit", BROWSE_LIMIT.to_string()));
        }
    }
    params
}

pub async fn search_venues(
    client: &reqwest::Client,
    config: &FoursquareConfig,
    query: &VenueQuery,
) -> AppResult<Vec<VenueResult>> {
    if !config.is_configured() {
        return Err(AppError::Configuration(
            "Foursquare API misconfigured - please contact partyof4 administrator".to_string(),
        ));
    }

    let url = format!("{}/v2/venues/explore", config.base_url.trim_end_matches('/'));
    let resp = client
        .get(&url)
        .query(&build_explore_params(config, query))
        .send()
        .await
        .map_err(|e| {
            warn!("📍 Foursquare unreachable: {}", e);
            upstream_error()
        })?;

    if !resp.status().is_success() {
        warn!("📍 Foursquare non-OK: {}", resp.status());
        return Err(upstream_error());
    }

    let body = resp.text().await.map_err(|e| {
        warn!("📍 Foursquare body read failed: {}", e);
        upstream_error()
    })?;

    parse_explore_body(&body)
}

/// Maps a raw explore payload to venue results. Venues without an id or
/// coordinates are skipped; a payload without a first entry in
/// `response.groups` is rejected.
pub fn parse_explore_body(body: &str) -> AppResult<Vec<VenueResult>> {
    let parsed: ExploreResponse = serde_json::from_str(body).map_err(|e| {
        warn!("📍 Foursquare JSON parse failed: {}", e);
        upstream_error()
    })?;

    let Some(groups) = parsed.response.and_then(|r| r.groups) else {
        warn!("📍 Foursquare response missing response.groups");
        return Err(upstream_error());
    };

    let Some(first_group) = groups.into_iter().next() else {
        warn!("📍 Foursquare response has no groups");
        return Err(upstream_error());
    };
    let items = first_group.items.unwrap_or_default();

    Ok(items
        .into_iter()
        .filter_map(|item| item.venue)
        .filter_map(venue_to_result)
        .collect())
}

fn venue_to_result(venue: Venue) -> Option<VenueResult> {
    let location_id = venue.id.filter(|s| !s.trim().is_empty())?;
    let location = venue.location?;
    let latitude = location.lat?;
    let longitude = location.lng?;

    let tags = venue
        .categories
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Some(VenueResult {
        location_id,
        name: venue.name.unwrap_or_default(),
        location: location.formatted_address.unwrap_or_default(),
        distance: location.distance,
        price: venue.price.and_then(|p| p.tier).unwrap_or(0),
        tags,
        coords: Coords {
            latitude,
            longitude,
        },
    })
}

/// Stores venues not seen before. Existing rows win; failures are logged and
/// never surface to the caller. Returns the number of new venues.
pub async fn cache_venues(pool: &SqlitePool, venues: &[VenueResult]) -> usize {
    let now = now_timestamp();
    let mut inserted = 0;

    for venue in venues {
        let tags_json = match serde_json::to_string(&venue.tags) {
            Ok(v) => v,
            Err(e) => {
                warn!("📍 Could not encode tags for {}: {}", venue.location_id, e);
                continue;
            }
        };
        let address = |idx: usize| venue.location.get(idx).map(String::as_str);

        let res = location_repo::insert_location_if_absent(
            pool,
            location_repo::NewLocation {
                four_square_id: &venue.location_id,
                name: &venue.name,
                street: address(0),
                city: address(1),
                country: address(2),
                price: venue.price,
                latitude: venue.coords.latitude,
                longitude: venue.coords.longitude,
                tags_json: &tags_json,
                now: &now,
            },
        )
        .await;

        match res {
            Ok(n) => inserted += n as usize,
            Err(e) => warn!("📍 Venue cache insert failed for {}: {}", venue.location_id, e),
        }
    }

    if inserted > 0 {
        info!("📍 Cached {} new venues", inserted);
    }
    inserted
}

fn upstream_error() -> AppError {
    AppError::Upstream(
        "Unexpected server error - please contact partyof4 administrator".to_string(),
    )
}
