#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventsRow {
    pub id: i64,
    pub host_id: i64,
    pub location_id: i64,
    pub planned_time: String,
    pub capacity: i64,
    pub current_size: i64,
    pub current_activity: String,
    pub completed_status: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl EventsRow {
    pub fn is_completed(&self) -> bool {
        self.completed_status == 1
    }
}

// Event joined with its venue, for proximity lookups.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NearbyEventRow {
    pub id: i64,
    pub host_id: i64,
    pub location_id: i64,
    pub planned_time: String,
    pub capacity: i64,
    pub current_size: i64,
    pub current_activity: String,
    pub completed_status: i64,
    pub created_at: String,
    pub updated_at: String,
    pub location_four_square_id: String,
    pub location_name: String,
    pub location_street: Option<String>,
    pub location_city: Option<String>,
    pub location_country: Option<String>,
    pub location_price: i64,
    pub location_latitude: f64,
    pub location_longitude: f64,
    pub location_tags: String,
    pub location_created_at: String,
}
