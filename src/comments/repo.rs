use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub story_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: OffsetDateTime,
}

/// Comment joined with its author and like count for the story page.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub story_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub author_username: String,
    pub like_count: i64,
}

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, user_id, story_id, parent_id, content, created_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// All comments of a story, flat, oldest first. The parent/child grouping
/// is reconstructed at read time.
pub async fn list_rows_for_story(
    db: &PgPool,
    story_id: Uuid,
) -> Result<Vec<CommentRow>, sqlx::Error> {
    sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.user_id, c.story_id, c.parent_id, c.content, c.created_at,
               u.username AS author_username,
               (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS like_count
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.story_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(story_id)
    .fetch_all(db)
    .await
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    story_id: Uuid,
    parent_id: Option<Uuid>,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (user_id, story_id, parent_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, story_id, parent_id, content, created_at
        "#,
    )
    .bind(user_id)
    .bind(story_id)
    .bind(parent_id)
    .bind(content)
    .fetch_one(&mut **tx)
    .await
}

/// Removes a comment, its direct replies, all likes on any of them, and
/// every notification referencing them. Runs inside the caller's
/// transaction.
pub async fn delete_cascade_tx(
    tx: &mut Transaction<'_, Postgres>,
    comment_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM comment_likes
        WHERE comment_id = $1
           OR comment_id IN (SELECT id FROM comments WHERE parent_id = $1)
        "#,
    )
    .bind(comment_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE comment_id = $1
           OR comment_id IN (SELECT id FROM comments WHERE parent_id = $1)
        "#,
    )
    .bind(comment_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM comments WHERE parent_id = $1")
        .bind(comment_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

pub async fn count_by_user(db: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await
}
