use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

/// Why a notification was created. Stored as text in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StoryLike,
    CommentLike,
    NewComment,
    Reply,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StoryLike => "story_like",
            Self::CommentLike => "comment_like",
            Self::NewComment => "new_comment",
            Self::Reply => "reply",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub story_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    kind: NotificationKind,
    message: &str,
    story_id: Option<Uuid>,
    comment_id: Option<Uuid>,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, story_id, comment_id, kind, message)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, story_id, comment_id, kind, message, is_read, created_at
        "#,
    )
    .bind(user_id)
    .bind(story_id)
    .bind(comment_id)
    .bind(kind.as_str())
    .bind(message)
    .fetch_one(&mut **tx)
    .await
}

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, story_id, comment_id, kind, message, is_read, created_at
        FROM notifications
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// A feed, not a conversation: newest first.
pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, story_id, comment_id, kind, message, is_read, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn count_unread(db: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
    )
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn mark_all_read(db: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let res =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
            .bind(user_id)
            .execute(db)
            .await?;
    Ok(res.rows_affected())
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM notifications WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_all_for_user(db: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_match_stored_values() {
        assert_eq!(NotificationKind::StoryLike.as_str(), "story_like");
        assert_eq!(NotificationKind::CommentLike.as_str(), "comment_like");
        assert_eq!(NotificationKind::NewComment.as_str(), "new_comment");
        assert_eq!(NotificationKind::Reply.as_str(), "reply");
    }

    #[test]
    fn kind_serde_uses_snake_case() {
        let json = serde_json::to_string(&NotificationKind::NewComment).unwrap();
        assert_eq!(json, r#""new_comment""#);
        let kind: NotificationKind = serde_json::from_str(r#""story_like""#).unwrap();
        assert_eq!(kind, NotificationKind::StoryLike);
    }
}
