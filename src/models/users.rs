#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image_url: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub connected_to_facebook: i64,
    pub interests: String, // JSON array of strings
    pub created_at: String,
    pub updated_at: String,
}
