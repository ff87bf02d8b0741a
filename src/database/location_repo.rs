use sqlx::SqlitePool;

use crate::models::LocationsRow;

pub struct NewLocation<'a> {
    pub four_square_id: &'a str,
    pub name: &'a str,
    pub street: Option<&'a str>,
    pub city: Option<&'a str>,
    pub country: Option<&'a str>,
    pub price: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub tags_json: &'a str,
    pub now: &'a str,
}

// Keep-existing conflict policy: a venue row is written once and never refreshed.
const SQL_INSERT_LOCATION_IF_ABSENT: &str = r#"
INSERT INTO locations (
  four_square_id,
  name,
  street,
  city,
  country,
  price,
  latitude,
  longitude,
  tags,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
ON CONFLICT(four_square_id) DO NOTHING
"#;

/// Returns 1 when the venue was new, 0 when it was already stored.
pub async fn insert_location_if_absent(
    pool: &SqlitePool,
    loc: NewLocation<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_LOCATION_IF_ABSENT)
        .bind(loc.four_square_id)
        .bind(loc.name)
        .bind(loc.street)
        .bind(loc.city)
        .bind(loc.country)
        .bind(loc.price)
        .bind(loc.latitude)
        .bind(loc.longitude)
        .bind(loc.tags_json)
        .bind(loc.now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_LOCATION_BY_ID: &str = r#"
SELECT
  id,
  four_square_id,
  name,
  street,
  city,
  country,
  price,
  latitude,
  longitude,
  tags,
  created_at
FROM locations
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_location_by_id(
    pool: &SqlitePool,
    location_id: i64,
) -> sqlx::Result<Option<LocationsRow>> {
    sqlx::query_as::<_, LocationsRow>(SQL_LOAD_LOCATION_BY_ID)
        .bind(location_id)
        .fetch_optional(pool)
        .await
}

const SQL_LOAD_LOCATION_BY_FOURSQUARE_ID: &str = r#"
SELECT
  id,
  four_square_id,
  name,
  street,
  city,
  country,
  price,
  latitude,
  longitude,
  tags,
  created_at
FROM locations
WHERE four_square_id = ?1
LIMIT 1
"#;

pub async fn load_location_by_foursquare_id(
    pool: &SqlitePool,
    four_square_id: &str,
) -> sqlx::Result<Option<LocationsRow>> {
    sqlx::query_as::<_, LocationsRow>(SQL_LOAD_LOCATION_BY_FOURSQUARE_ID)
        .bind(four_square_id)
        .fetch_optional(pool)
        .await
}
