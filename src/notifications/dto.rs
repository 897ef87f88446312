use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct NotificationView {
    pub id: Uuid,
    pub kind: String,
    pub message: String,
    pub story_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

impl From<crate::notifications::repo::Notification> for NotificationView {
    fn from(n: crate::notifications::repo::Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            message: n.message,
            story_id: n.story_id,
            comment_id: n.comment_id,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}
