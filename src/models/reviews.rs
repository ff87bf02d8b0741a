#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewsRow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub event_id: Option<i64>,
    pub star_rating: i64,
    pub text: String,
    pub created_at: String,
}
