use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{EventsRow, NearbyEventRow};

pub struct NewEvent<'a> {
    pub host_id: i64,
    pub location_id: i64,
    pub planned_time: &'a str,
    pub capacity: i64,
    pub current_size: i64,
    pub current_activity: &'a str,
    pub now: &'a str,
}

pub struct EventChanges<'a> {
    pub id: i64,
    pub planned_time: &'a str,
    pub capacity: i64,
    pub current_size: i64,
    pub current_activity: &'a str,
    pub completed_status: bool,
    pub now: &'a str,
}

/// Bounding box in degrees: (min_lat, max_lat, min_lon, max_lon). When the
/// box crosses the antimeridian `min_lon` is greater than `max_lon`.
pub type GeoBounds = (f64, f64, f64, f64);

const SQL_INSERT_EVENT: &str = r#"
INSERT INTO events (
  host_id,
  location_id,
  planned_time,
  capacity,
  current_size,
  current_activity,
  completed_status,
  created_at,
  updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)
"#;

pub async fn insert_event<'e, E>(executor: E, event: NewEvent<'_>) -> sqlx::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_EVENT)
        .bind(event.host_id)
        .bind(event.location_id)
        .bind(event.planned_time)
        .bind(event.capacity)
        .bind(event.current_size)
        .bind(event.current_activity)
        .bind(event.now)
        .execute(executor)
        .await?;
    Ok(res.last_insert_rowid())
}

const SQL_LOAD_EVENT_BY_ID: &str = r#"
SELECT
  id,
  host_id,
  location_id,
  planned_time,
  capacity,
  current_size,
  current_activity,
  completed_status,
  created_at,
  updated_at
FROM events
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_event_by_id<'e, E>(executor: E, event_id: i64) -> sqlx::Result<Option<EventsRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EventsRow>(SQL_LOAD_EVENT_BY_ID)
        .bind(event_id)
        .fetch_optional(executor)
        .await
}

const SQL_UPDATE_EVENT: &str = r#"
UPDATE events
SET planned_time = ?1,
    capacity = ?2,
    current_size = ?3,
    current_activity = ?4,
    completed_status = ?5,
    updated_at = ?6
WHERE id = ?7
"#;

pub async fn update_event(pool: &SqlitePool, changes: EventChanges<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_EVENT)
        .bind(changes.planned_time)
        .bind(changes.capacity)
        .bind(changes.current_size)
        .bind(changes.current_activity)
        .bind(i64::from(changes.completed_status))
        .bind(changes.now)
        .bind(changes.id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

// The seat is taken only while the event is open and below capacity.
const SQL_TAKE_SEAT: &str = r#"
UPDATE events
SET current_size = current_size + 1,
    updated_at = ?1
WHERE id = ?2
  AND current_size < capacity
  AND completed_status = 0
"#;

/// Returns 0 when the event is full or completed.
pub async fn take_seat<'e, E>(executor: E, event_id: i64, now: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_TAKE_SEAT)
        .bind(now)
        .bind(event_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_RELEASE_SEAT: &str = r#"
UPDATE events
SET current_size = MAX(current_size - 1, 0),
    updated_at = ?1
WHERE id = ?2
"#;

pub async fn release_seat<'e, E>(executor: E, event_id: i64, now: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_RELEASE_SEAT)
        .bind(now)
        .bind(event_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_MARK_COMPLETED: &str = r#"
UPDATE events
SET completed_status = 1,
    updated_at = ?1
WHERE id = ?2
  AND completed_status = 0
"#;

pub async fn mark_completed(pool: &SqlitePool, event_id: i64, now: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_COMPLETED)
        .bind(now)
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_OPEN_IN_BOUNDS: &str = r#"
SELECT
  e.id,
  e.host_id,
  e.location_id,
  e.planned_time,
  e.capacity,
  e.current_size,
  e.current_activity,
  e.completed_status,
  e.created_at,
  e.updated_at,
  l.four_square_id AS location_four_square_id,
  l.name AS location_name,
  l.street AS location_street,
  l.city AS location_city,
  l.country AS location_country,
  l.price AS location_price,
  l.latitude AS location_latitude,
  l.longitude AS location_longitude,
  l.tags AS location_tags,
  l.created_at AS location_created_at
FROM events e
JOIN locations l
  ON l.id = e.location_id
WHERE e.completed_status = 0
  AND l.latitude IS NOT NULL
  AND l.longitude IS NOT NULL
  AND l.latitude BETWEEN ?1 AND ?2
  AND (
    (?3 <= ?4 AND l.longitude BETWEEN ?3 AND ?4)
    OR (?3 > ?4 AND (l.longitude >= ?3 OR l.longitude <= ?4))
  )
ORDER BY e.planned_time ASC
"#;

/// Every open event whose venue falls inside the box. A box with
/// `min_lon > max_lon` wraps across the antimeridian.
pub async fn list_open_in_bounds(
    pool: &SqlitePool,
    bounds: GeoBounds,
) -> sqlx::Result<Vec<NearbyEventRow>> {
    let (min_lat, max_lat, min_lon, max_lon) = bounds;
    sqlx::query_as::<_, NearbyEventRow>(SQL_LIST_OPEN_IN_BOUNDS)
        .bind(min_lat)
        .bind(max_lat)
        .bind(min_lon)
        .bind(max_lon)
        .fetch_all(pool)
        .await
}

const SQL_LIST_HISTORY_FOR_USER: &str = r#"
SELECT
  e.id,
  e.host_id,
  e.location_id,
  e.planned_time,
  e.capacity,
  e.current_size,
  e.current_activity,
  e.completed_status,
  e.created_at,
  e.updated_at
FROM events e
WHERE e.completed_status = 1
  AND (
    e.host_id = ?1
    OR EXISTS (
      SELECT 1
      FROM event_members m
      WHERE m.event_id = e.id
        AND m.user_id = ?1
        AND m.approved = 1
    )
  )
ORDER BY e.planned_time DESC, e.id DESC
"#;

pub async fn list_history_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> sqlx::Result<Vec<EventsRow>> {
    sqlx::query_as::<_, EventsRow>(SQL_LIST_HISTORY_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
