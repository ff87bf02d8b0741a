#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationsRow {
    pub id: i64,
    pub four_square_id: String,
    pub name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub price: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tags: String, // JSON array of category names
    pub created_at: String,
}
