use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::database::{event_member_repo, event_repo, location_repo, now_timestamp, user_repo};
use crate::error::{AppError, AppResult};
use crate::models::{EventMemberProfileRow, EventMembersRow, EventsRow, LocationsRow, NearbyEventRow};
use crate::services::geo;
use crate::services::location_service::LocationView;
use crate::services::policy::{authorize, Capability};
use crate::services::user_service::UserSummaryView;

const DEFAULT_RADIUS_KM: f64 = 5.0;
const MIN_RADIUS_KM: f64 = 1.0;
const MAX_RADIUS_KM: f64 = 500.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: i64,
    pub host_id: i64,
    pub location_id: i64,
    pub planned_time: String,
    pub capacity: i64,
    pub current_size: i64,
    pub current_activity: String,
    pub completed_status: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EventsRow> for EventView {
    fn from(row: EventsRow) -> Self {
        Self {
            id: row.id,
            host_id: row.host_id,
            location_id: row.location_id,
            completed_status: row.is_completed(),
            planned_time: row.planned_time,
            capacity: row.capacity,
            current_size: row.current_size,
            current_activity: row.current_activity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub user_id: i64,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub approved: bool,
    pub status: String,
}

impl From<EventMemberProfileRow> for MemberView {
    fn from(row: EventMemberProfileRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            profile_image_url: row.profile_image_url,
            approved: row.approved == 1,
            status: row.status,
        }
    }
}

/// Event with its venue, host and member list.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetailView {
    #[serde(flatten)]
    pub event: EventView,
    #[serde(rename = "Location")]
    pub location: Option<LocationView>,
    pub host: Option<UserSummaryView>,
    #[serde(rename = "Users")]
    pub users: Vec<MemberView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyEventView {
    #[serde(flatten)]
    pub event: EventView,
    #[serde(rename = "Location")]
    pub location: LocationView,
    /// Kilometres from the queried point.
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    pub event_id: i64,
    pub user_id: i64,
    pub approved: bool,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EventMembersRow> for MembershipView {
    fn from(row: EventMembersRow) -> Self {
        Self {
            event_id: row.event_id,
            user_id: row.user_id,
            approved: row.is_approved(),
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub host_id: i64,
    pub location_id: i64,
    pub planned_time: String,
    pub capacity: i64,
    pub current_size: Option<i64>,
    #[serde(default)]
    pub current_activity: String,
}

/// Host-controlled fields. Anything absent is left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    pub planned_time: Option<String>,
    pub capacity: Option<i64>,
    pub current_size: Option<i64>,
    pub current_activity: Option<String>,
    pub completed_status: Option<bool>,
}

pub async fn create_event(
    pool: &SqlitePool,
    caller_id: i64,
    input: CreateEventInput,
) -> AppResult<EventView> {
    // Events can only be created on one's own behalf.
    authorize(caller_id, Capability::SelfOf(input.host_id))?;

    let planned_time = normalize_planned_time(&input.planned_time)?;
    let current_size = input.current_size.unwrap_or(1);
    validate_size(input.capacity, current_size)?;

    if location_repo::load_location_by_id(pool, input.location_id)
        .await?
        .is_none()
    {
        return Err(AppError::validation(format!(
            "unknown location {}",
            input.location_id
        )));
    }

    let now = now_timestamp();
    let mut tx = pool.begin().await?;
    let event_id = event_repo::insert_event(
        &mut *tx,
        event_repo::NewEvent {
            host_id: input.host_id,
            location_id: input.location_id,
            planned_time: &planned_time,
            capacity: input.capacity,
            current_size,
            current_activity: input.current_activity.trim(),
            now: &now,
        },
    )
    .await?;
    event_member_repo::insert_member_if_absent(&mut *tx, event_id, input.host_id, true, &now)
        .await?;
    let row = event_repo::load_event_by_id(&mut *tx, event_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("event {event_id} vanished after insert")))?;
    tx.commit().await?;

    info!(event_id, host_id = input.host_id, "Event created");
    Ok(EventView::from(row))
}

pub async fn load_event_detail(pool: &SqlitePool, event_id: i64) -> AppResult<EventDetailView> {
    let event = load_event(pool, event_id).await?;
    let location = location_repo::load_location_by_id(pool, event.location_id)
        .await?
        .map(LocationView::from);
    let host = user_repo::load_user_by_id(pool, event.host_id)
        .await?
        .map(UserSummaryView::from);
    let users = event_member_repo::list_member_profiles(pool, event_id)
        .await?
        .into_iter()
        .map(MemberView::from)
        .collect();

    Ok(EventDetailView {
        event: EventView::from(event),
        location,
        host,
        users,
    })
}

/// Open events whose venue lies within `radius_km` of the point, nearest first.
pub async fn list_nearby(
    pool: &SqlitePool,
    latitude: f64,
    longitude: f64,
    radius_km: Option<f64>,
) -> AppResult<Vec<NearbyEventView>> {
    let radius_km = radius_km
        .filter(|r| r.is_finite())
        .unwrap_or(DEFAULT_RADIUS_KM)
        .clamp(MIN_RADIUS_KM, MAX_RADIUS_KM);
    let bounds = geo::bounding_box(latitude, longitude, radius_km);
    let rows = event_repo::list_open_in_bounds(pool, bounds).await?;

    let mut events: Vec<NearbyEventView> = rows
        .into_iter()
        .filter_map(|row| {
            let distance = geo::haversine_km(
                latitude,
                longitude,
                row.location_latitude,
                row.location_longitude,
            );
            (distance <= radius_km).then(|| split_nearby_row(row, distance))
        })
        .collect();
    events.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    Ok(events)
}

pub async fn update_event(
    pool: &SqlitePool,
    event_id: i64,
    caller_id: i64,
    input: UpdateEventInput,
) -> AppResult<EventView> {
    let event = load_event(pool, event_id).await?;
    authorize(caller_id, Capability::HostOf(&event))?;
    ensure_open(&event)?;

    let planned_time = match input.planned_time.as_deref() {
        Some(raw) => normalize_planned_time(raw)?,
        None => event.planned_time.clone(),
    };
    let capacity = input.capacity.unwrap_or(event.capacity);
    let current_size = input.current_size.unwrap_or(event.current_size);
    validate_size(capacity, current_size)?;

    let current_activity = input
        .current_activity
        .as_deref()
        .map(str::trim)
        .unwrap_or(event.current_activity.as_str())
        .to_string();
    let now = now_timestamp();

    event_repo::update_event(
        pool,
        event_repo::EventChanges {
            id: event_id,
            planned_time: &planned_time,
            capacity,
            current_size,
            current_activity: &current_activity,
            completed_status: input.completed_status.unwrap_or(false),
            now: &now,
        },
    )
    .await?;

    load_event(pool, event_id).await.map(EventView::from)
}

/// Records a join request. Repeated requests return the existing membership.
pub async fn request_join(
    pool: &SqlitePool,
    event_id: i64,
    caller_id: i64,
) -> AppResult<MembershipView> {
    let event = load_event(pool, event_id).await?;
    ensure_open(&event)?;

    let created =
        event_member_repo::insert_member_if_absent(pool, event_id, caller_id, false, &now_timestamp())
            .await?;
    if created > 0 {
        info!(event_id, user_id = caller_id, "Join requested");
    }

    load_membership(pool, event_id, caller_id).await
}

/// Sets a member's approval flag. Flipping the flag moves `current_size` by one;
/// the seat is claimed with a guarded update so concurrent approvals cannot
/// push the event past capacity.
pub async fn set_approval(
    pool: &SqlitePool,
    event_id: i64,
    caller_id: i64,
    target_user_id: i64,
    approved: bool,
) -> AppResult<MembershipView> {
    let event = load_event(pool, event_id).await?;
    authorize(caller_id, Capability::HostOf(&event))?;
    ensure_open(&event)?;

    let Some(member) = event_member_repo::load_member(pool, event_id, target_user_id).await? else {
        return Err(AppError::NotFound("Membership"));
    };
    if member.is_approved() == approved {
        return Ok(MembershipView::from(member));
    }

    let now = now_timestamp();
    // Writes come first so the transaction takes the write lock before it reads.
    let mut tx = pool.begin().await?;
    if approved {
        if event_repo::take_seat(&mut *tx, event_id, &now).await? == 0 {
            tx.rollback().await?;
            return Err(AppError::validation("event is already at capacity"));
        }
        if event_member_repo::set_approved(&mut *tx, event_id, target_user_id, true, &now).await?
            == 0
        {
            // Approved by a concurrent request in the meantime.
            tx.rollback().await?;
            return load_membership(pool, event_id, target_user_id).await;
        }
    } else {
        if event_member_repo::set_approved(&mut *tx, event_id, target_user_id, false, &now).await?
            == 0
        {
            tx.rollback().await?;
            return load_membership(pool, event_id, target_user_id).await;
        }
        event_repo::release_seat(&mut *tx, event_id, &now).await?;
    }
    let member = event_member_repo::load_member(&mut *tx, event_id, target_user_id)
        .await?
        .ok_or(AppError::NotFound("Membership"))?;
    tx.commit().await?;

    info!(event_id, user_id = target_user_id, approved, "Membership approval changed");
    Ok(MembershipView::from(member))
}

pub async fn update_status(
    pool: &SqlitePool,
    event_id: i64,
    caller_id: i64,
    status: &str,
) -> AppResult<MembershipView> {
    let event = load_event(pool, event_id).await?;
    let member = event_member_repo::load_member(pool, event_id, caller_id).await?;
    authorize(caller_id, Capability::MemberOf(member.as_ref()))?;
    ensure_open(&event)?;

    event_member_repo::set_status(pool, event_id, caller_id, status.trim(), &now_timestamp())
        .await?;
    load_membership(pool, event_id, caller_id).await
}

/// Completed events the user hosted or was an approved member of.
pub async fn list_history(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<EventView>> {
    if user_repo::load_user_by_id(pool, user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    let rows = event_repo::list_history_for_user(pool, user_id).await?;
    Ok(rows.into_iter().map(EventView::from).collect())
}

/// Moves one of the user's hosted events into history.
pub async fn complete_event(
    pool: &SqlitePool,
    user_id: i64,
    caller_id: i64,
    event_id: i64,
) -> AppResult<EventView> {
    authorize(caller_id, Capability::SelfOf(user_id))?;
    let event = load_event(pool, event_id).await?;
    authorize(caller_id, Capability::HostOf(&event))?;

    if event_repo::mark_completed(pool, event_id, &now_timestamp()).await? > 0 {
        info!(event_id, "Event completed");
    }
    load_event(pool, event_id).await.map(EventView::from)
}

async fn load_event(pool: &SqlitePool, event_id: i64) -> AppResult<EventsRow> {
    event_repo::load_event_by_id(pool, event_id)
        .await?
        .ok_or(AppError::NotFound("Event"))
}

async fn load_membership(pool: &SqlitePool, event_id: i64, user_id: i64) -> AppResult<MembershipView> {
    event_member_repo::load_member(pool, event_id, user_id)
        .await?
        .map(MembershipView::from)
        .ok_or(AppError::NotFound("Membership"))
}

fn ensure_open(event: &EventsRow) -> AppResult<()> {
    if event.is_completed() {
        return Err(AppError::validation("event is completed and can no longer change"));
    }
    Ok(())
}

fn validate_size(capacity: i64, current_size: i64) -> AppResult<()> {
    if capacity < 1 {
        return Err(AppError::validation("capacity must be at least 1"));
    }
    if !(0..=capacity).contains(&current_size) {
        return Err(AppError::validation(
            "currentSize must be between 0 and capacity",
        ));
    }
    Ok(())
}

/// Accepts any RFC 3339 timestamp and stores it as UTC with millisecond precision.
fn normalize_planned_time(raw: &str) -> AppResult<String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| {
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        })
        .map_err(|_| AppError::validation("plannedTime must be an RFC 3339 timestamp"))
}

fn split_nearby_row(row: NearbyEventRow, distance: f64) -> NearbyEventView {
    let location = LocationView::from(LocationsRow {
        id: row.location_id,
        four_square_id: row.location_four_square_id,
        name: row.location_name,
        street: row.location_street,
        city: row.location_city,
        country: row.location_country,
        price: row.location_price,
        latitude: Some(row.location_latitude),
        longitude: Some(row.location_longitude),
        tags: row.location_tags,
        created_at: row.location_created_at,
    });
    let event = EventView::from(EventsRow {
        id: row.id,
        host_id: row.host_id,
        location_id: row.location_id,
        planned_time: row.planned_time,
        capacity: row.capacity,
        current_size: row.current_size,
        current_activity: row.current_activity,
        completed_status: row.completed_status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    });

    NearbyEventView {
        event,
        location,
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planned_time_is_normalized_to_utc_millis() {
        assert_eq!(
            normalize_planned_time("2015-09-03T02:30:00.000Z").unwrap(),
            "2015-09-03T02:30:00.000Z"
        );
        assert_eq!(
            normalize_planned_time("2015-09-02T19:30:00-07:00").unwrap(),
            "2015-09-03T02:30:00.000Z"
        );
        assert!(normalize_planned_time("next friday").is_err());
    }

    #[test]
    fn size_must_fit_capacity() {
        assert!(validate_size(10, 4).is_ok());
        assert!(validate_size(10, 10).is_ok());
        assert!(validate_size(10, 0).is_ok());
        assert!(validate_size(0, 0).is_err());
        assert!(validate_size(4, 5).is_err());
        assert!(validate_size(4, -1).is_err());
    }
}
