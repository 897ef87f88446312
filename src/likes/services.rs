use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::repo;
use crate::auth::repo::User;
use crate::comments;
use crate::error::{ApiError, ApiResult};
use crate::notifications::repo::NotificationKind;
use crate::notifications::services::notify_tx;
use crate::state::AppState;
use crate::stories;

/// Outcome of a toggle: the new state and the fresh total.
#[derive(Debug, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: i64,
}

/// Flips the (actor, story) like. Removing wins if a like exists; otherwise
/// one is inserted and, unless the actor owns the story, the owner is
/// notified. An insert that loses the double-submit race counts as
/// "already liked" and produces no second notification.
pub async fn toggle_story_like(
    state: &AppState,
    actor_id: Uuid,
    story_id: Uuid,
) -> ApiResult<LikeToggle> {
    let story = stories::repo::find(&state.db, story_id)
        .await?
        .ok_or_else(|| ApiError::not_found("story not found"))?;
    let actor = User::find_by_id(&state.db, actor_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user no longer exists".into()))?;

    let mut tx = state.db.begin().await?;

    let liked = if repo::delete_story_like_tx(&mut tx, actor_id, story_id).await? {
        false
    } else {
        let inserted = repo::insert_story_like_tx(&mut tx, actor_id, story_id).await?;
        if inserted && story.user_id != actor_id {
            notify_tx(
                &mut tx,
                story.user_id,
                NotificationKind::StoryLike,
                &actor.username,
                Some(story_id),
                None,
            )
            .await?;
        }
        true
    };

    let like_count = repo::count_story_likes_tx(&mut tx, story_id).await?;
    tx.commit().await?;

    info!(story_id = %story_id, user_id = %actor_id, liked, like_count, "story like toggled");
    Ok(LikeToggle { liked, like_count })
}

pub async fn toggle_comment_like(
    state: &AppState,
    actor_id: Uuid,
    comment_id: Uuid,
) -> ApiResult<LikeToggle> {
    let comment = comments::repo::find(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("comment not found"))?;
    let actor = User::find_by_id(&state.db, actor_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user no longer exists".into()))?;

    let mut tx = state.db.begin().await?;

    let liked = if repo::delete_comment_like_tx(&mut tx, actor_id, comment_id).await? {
        false
    } else {
        let inserted = repo::insert_comment_like_tx(&mut tx, actor_id, comment_id).await?;
        if inserted && comment.user_id != actor_id {
            notify_tx(
                &mut tx,
                comment.user_id,
                NotificationKind::CommentLike,
                &actor.username,
                None,
                Some(comment_id),
            )
            .await?;
        }
        true
    };

    let like_count = repo::count_comment_likes_tx(&mut tx, comment_id).await?;
    tx.commit().await?;

    info!(comment_id = %comment_id, user_id = %actor_id, liked, like_count, "comment like toggled");
    Ok(LikeToggle { liked, like_count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_response_shape() {
        let toggled = LikeToggle {
            liked: true,
            like_count: 1,
        };
        let json = serde_json::to_value(&toggled).unwrap();
        assert_eq!(json["liked"], true);
        assert_eq!(json["like_count"], 1);
    }
}
