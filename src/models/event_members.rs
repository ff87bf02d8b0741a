// One row per (event, user): join request, approval flag and status text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventMembersRow {
    pub event_id: i64,
    pub user_id: i64,
    pub approved: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl EventMembersRow {
    pub fn is_approved(&self) -> bool {
        self.approved == 1
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventMemberProfileRow {
    pub user_id: i64,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub approved: i64,
    pub status: String,
}
