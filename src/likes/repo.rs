use std::collections::HashSet;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Inserts a story like; returns false when the (user, story) pair already
/// exists. The unique index makes the double-submit race harmless: the
/// losing insert simply affects zero rows.
pub async fn insert_story_like_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    story_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        r#"
        INSERT INTO story_likes (user_id, story_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, story_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(story_id)
    .execute(&mut **tx)
    .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn delete_story_like_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    story_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM story_likes WHERE user_id = $1 AND story_id = $2")
        .bind(user_id)
        .bind(story_id)
        .execute(&mut **tx)
        .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn count_story_likes_tx(
    tx: &mut Transaction<'_, Postgres>,
    story_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM story_likes WHERE story_id = $1")
        .bind(story_id)
        .fetch_one(&mut **tx)
        .await
}

pub async fn insert_comment_like_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    comment_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        r#"
        INSERT INTO comment_likes (user_id, comment_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, comment_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(comment_id)
    .execute(&mut **tx)
    .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn delete_comment_like_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    comment_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM comment_likes WHERE user_id = $1 AND comment_id = $2")
        .bind(user_id)
        .bind(comment_id)
        .execute(&mut **tx)
        .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn count_comment_likes_tx(
    tx: &mut Transaction<'_, Postgres>,
    comment_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment_likes WHERE comment_id = $1")
        .bind(comment_id)
        .fetch_one(&mut **tx)
        .await
}

/// Which of the given stories the user currently likes.
pub async fn story_ids_liked_by(
    db: &PgPool,
    user_id: Uuid,
    story_ids: &[Uuid],
) -> Result<HashSet<Uuid>, sqlx::Error> {
    if story_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let rows = sqlx::query_scalar::<_, Uuid>(
        "SELECT story_id FROM story_likes WHERE user_id = $1 AND story_id = ANY($2)",
    )
    .bind(user_id)
    .bind(story_ids)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().collect())
}

pub async fn comment_ids_liked_by(
    db: &PgPool,
    user_id: Uuid,
    comment_ids: &[Uuid],
) -> Result<HashSet<Uuid>, sqlx::Error> {
    if comment_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let rows = sqlx::query_scalar::<_, Uuid>(
        "SELECT comment_id FROM comment_likes WHERE user_id = $1 AND comment_id = ANY($2)",
    )
    .bind(user_id)
    .bind(comment_ids)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Total likes received across all of a user's stories (profile stats).
pub async fn count_likes_received(db: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM story_likes sl
        JOIN stories s ON s.id = sl.story_id
        WHERE s.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await
}
