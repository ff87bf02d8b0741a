use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::database::{event_repo, now_timestamp, review_repo, user_repo};
use crate::error::{AppError, AppResult};
use crate::models::ReviewsRow;

const MAX_STARS: i64 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub event_id: Option<i64>,
    pub star_rating: i64,
    pub text: String,
    pub created_at: String,
}

impl From<ReviewsRow> for ReviewView {
    fn from(row: ReviewsRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            author_id: row.author_id,
            event_id: row.event_id,
            star_rating: row.star_rating,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReviewInput {
    pub star_rating: i64,
    #[serde(default)]
    pub text: String,
    pub event_id: Option<i64>,
}

pub async fn list_reviews(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<ReviewView>> {
    if user_repo::load_user_by_id(pool, user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    let rows = review_repo::list_reviews_for_user(pool, user_id).await?;
    Ok(rows.into_iter().map(ReviewView::from).collect())
}

pub async fn post_review(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
    input: NewReviewInput,
) -> AppResult<ReviewView> {
    if !(0..=MAX_STARS).contains(&input.star_rating) {
        return Err(AppError::validation(format!(
            "starRating must be between 0 and {MAX_STARS}"
        )));
    }
    if user_id == author_id {
        return Err(AppError::validation("you cannot review yourself"));
    }
    if user_repo::load_user_by_id(pool, user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    if let Some(event_id) = input.event_id {
        if event_repo::load_event_by_id(pool, event_id).await?.is_none() {
            return Err(AppError::validation(format!("unknown event {event_id}")));
        }
    }

    let review_id = review_repo::insert_review(
        pool,
        review_repo::NewReview {
            user_id,
            author_id,
            event_id: input.event_id,
            star_rating: input.star_rating,
            text: input.text.trim(),
            now: &now_timestamp(),
        },
    )
    .await?;
    info!(review_id, user_id, author_id, "Review posted");

    review_repo::load_review_by_id(pool, review_id)
        .await?
        .map(ReviewView::from)
        .ok_or(AppError::NotFound("Review"))
}
