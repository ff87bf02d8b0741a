#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionsRow {
    pub token: String,
    pub user_id: i64,
    pub created_at: String,
}
