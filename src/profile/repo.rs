use sqlx::PgPool;
use uuid::Uuid;

pub async fn count_stories_by_user(db: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stories WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await
}
