use sqlx::{Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::repo::{self, Notification, NotificationKind};

/// Display message precomputed at fan-out time, so the feed never needs a
/// join back to the acting user.
pub fn message_for(kind: NotificationKind, actor_username: &str) -> String {
    match kind {
        NotificationKind::StoryLike => format!("{} liked your story", actor_username),
        NotificationKind::CommentLike => format!("{} liked your comment", actor_username),
        NotificationKind::NewComment => format!("{} commented on your story", actor_username),
        NotificationKind::Reply => format!("{} replied to your comment", actor_username),
    }
}

/// Appends a notification inside the caller's transaction. Callers are
/// responsible for the self-action check; nothing here filters recipients.
pub async fn notify_tx(
    tx: &mut Transaction<'_, Postgres>,
    recipient: Uuid,
    kind: NotificationKind,
    actor_username: &str,
    story_id: Option<Uuid>,
    comment_id: Option<Uuid>,
) -> Result<Notification, sqlx::Error> {
    let message = message_for(kind, actor_username);
    let n = repo::insert_tx(tx, recipient, kind, &message, story_id, comment_id).await?;
    debug!(recipient = %recipient, kind = kind.as_str(), "notification created");
    Ok(n)
}
