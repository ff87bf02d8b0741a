use sqlx::SqlitePool;

use crate::models::ReviewsRow;

pub struct NewReview<'a> {
    pub user_id: i64,
    pub author_id: i64,
    pub event_id: Option<i64>,
    pub star_rating: i64,
    pub text: &'a str,
    pub now: &'a str,
}

const SQL_INSERT_REVIEW: &str = r#"
INSERT INTO reviews (
  user_id,
  author_id,
  event_id,
  star_rating,
  text,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub async fn insert_review(pool: &SqlitePool, review: NewReview<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_REVIEW)
        .bind(review.user_id)
        .bind(review.author_id)
        .bind(review.event_id)
        .bind(review.star_rating)
        .bind(review.text)
        .bind(review.now)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}

const SQL_LOAD_REVIEW_BY_ID: &str = r#"
SELECT id, user_id, author_id, event_id, star_rating, text, created_at
FROM reviews
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_review_by_id(
    pool: &SqlitePool,
    review_id: i64,
) -> sqlx::Result<Option<ReviewsRow>> {
    sqlx::query_as::<_, ReviewsRow>(SQL_LOAD_REVIEW_BY_ID)
        .bind(review_id)
        .fetch_optional(pool)
        .await
}

const SQL_LIST_REVIEWS_FOR_USER: &str = r#"
SELECT id, user_id, author_id, event_id, star_rating, text, created_at
FROM reviews
WHERE user_id = ?1
ORDER BY created_at DESC, id DESC
"#;

pub async fn list_reviews_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> sqlx::Result<Vec<ReviewsRow>> {
    sqlx::query_as::<_, ReviewsRow>(SQL_LIST_REVIEWS_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
