use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Story {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
    pub image_key: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Story joined with its author and aggregate counts, as used by every
/// listing query.
#[derive(Debug, Clone, FromRow)]
pub struct StoryListRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
    pub image_key: Option<String>,
    pub created_at: OffsetDateTime,
    pub author_username: String,
    pub like_count: i64,
    pub comment_count: i64,
}

const LIST_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.content, s.is_anonymous, s.image_key, s.created_at,
           u.username AS author_username,
           (SELECT COUNT(*) FROM story_likes sl WHERE sl.story_id = s.id) AS like_count,
           (SELECT COUNT(*) FROM comments c WHERE c.story_id = s.id) AS comment_count
    FROM stories s
    JOIN users u ON u.id = s.user_id
"#;

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Story>, sqlx::Error> {
    sqlx::query_as::<_, Story>(
        r#"
        SELECT id, user_id, content, is_anonymous, image_key, created_at
        FROM stories
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_row(db: &PgPool, id: Uuid) -> Result<Option<StoryListRow>, sqlx::Error> {
    let sql = format!("{LIST_SELECT} WHERE s.id = $1");
    sqlx::query_as::<_, StoryListRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    content: &str,
    is_anonymous: bool,
    image_key: Option<&str>,
) -> Result<Story, sqlx::Error> {
    sqlx::query_as::<_, Story>(
        r#"
        INSERT INTO stories (user_id, content, is_anonymous, image_key)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, content, is_anonymous, image_key, created_at
        "#,
    )
    .bind(user_id)
    .bind(content)
    .bind(is_anonymous)
    .bind(image_key)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    content: &str,
    is_anonymous: bool,
    image_key: Option<&str>,
) -> Result<Story, sqlx::Error> {
    sqlx::query_as::<_, Story>(
        r#"
        UPDATE stories
        SET content = $2, is_anonymous = $3, image_key = $4
        WHERE id = $1
        RETURNING id, user_id, content, is_anonymous, image_key, created_at
        "#,
    )
    .bind(id)
    .bind(content)
    .bind(is_anonymous)
    .bind(image_key)
    .fetch_one(db)
    .await
}

pub async fn list_latest(
    db: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<StoryListRow>, sqlx::Error> {
    let sql = format!("{LIST_SELECT} ORDER BY s.created_at DESC LIMIT $1 OFFSET $2");
    sqlx::query_as::<_, StoryListRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

/// Most-liked first; ties broken by recency so the ordering is stable.
pub async fn list_popular(
    db: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<StoryListRow>, sqlx::Error> {
    let sql = format!("{LIST_SELECT} ORDER BY like_count DESC, s.created_at DESC LIMIT $1 OFFSET $2");
    sqlx::query_as::<_, StoryListRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count_all(db: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stories")
        .fetch_one(db)
        .await
}

/// Case-insensitive substring search on content, newest first.
pub async fn search(
    db: &PgPool,
    query: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<StoryListRow>, sqlx::Error> {
    let pattern = format!("%{}%", query);
    let sql = format!(
        "{LIST_SELECT} WHERE s.content ILIKE $1 ORDER BY s.created_at DESC LIMIT $2 OFFSET $3"
    );
    sqlx::query_as::<_, StoryListRow>(&sql)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count_search(db: &PgPool, query: &str) -> Result<i64, sqlx::Error> {
    let pattern = format!("%{}%", query);
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stories WHERE content ILIKE $1")
        .bind(pattern)
        .fetch_one(db)
        .await
}

pub async fn recent_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<Story>, sqlx::Error> {
    sqlx::query_as::<_, Story>(
        r#"
        SELECT id, user_id, content, is_anonymous, image_key, created_at
        FROM stories
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Removes a story and everything hanging off it, in dependency order:
/// likes on its comments, notifications referencing it or its comments,
/// the comments themselves, likes on the story, then the story row.
/// Runs inside the caller's transaction.
pub async fn delete_cascade_tx(
    tx: &mut Transaction<'_, Postgres>,
    story_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM comment_likes
        WHERE comment_id IN (SELECT id FROM comments WHERE story_id = $1)
        "#,
    )
    .bind(story_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE story_id = $1
           OR comment_id IN (SELECT id FROM comments WHERE story_id = $1)
        "#,
    )
    .bind(story_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM comments WHERE story_id = $1 AND parent_id IS NOT NULL")
        .bind(story_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM comments WHERE story_id = $1")
        .bind(story_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM story_likes WHERE story_id = $1")
        .bind(story_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM stories WHERE id = $1")
        .bind(story_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}
