use std::collections::HashMap;
use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use super::dto::CommentView;
use super::repo::{self, Comment, CommentRow};
use crate::auth::repo::User;
use crate::error::{ApiError, ApiResult};
use crate::notifications::repo::NotificationKind;
use crate::notifications::services::notify_tx;
use crate::state::AppState;
use crate::stories;

/// Replies must target a top-level comment on the same story. The read
/// model only ever shows two levels, so deeper chains are refused at the
/// write path instead of silently disappearing.
pub fn validate_parent(parent: &Comment, story_id: Uuid) -> ApiResult<()> {
    if parent.story_id != story_id {
        return Err(ApiError::validation(
            "parent comment belongs to a different story",
        ));
    }
    if parent.parent_id.is_some() {
        return Err(ApiError::validation("replies cannot be nested"));
    }
    Ok(())
}

/// Groups a flat, oldest-first comment list into top-level comments with
/// their replies. Input order is preserved on both levels.
pub fn build_tree(
    rows: Vec<CommentRow>,
    viewer: Option<Uuid>,
    liked: &HashSet<Uuid>,
) -> Vec<CommentView> {
    let mut out: Vec<CommentView> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let view = CommentView {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            author_name: row.author_username,
            like_count: row.like_count,
            user_has_liked: liked.contains(&row.id),
            can_delete: viewer == Some(row.user_id),
            replies: Vec::new(),
        };
        match row.parent_id {
            None => {
                index.insert(row.id, out.len());
                out.push(view);
            }
            Some(parent_id) => {
                if let Some(&i) = index.get(&parent_id) {
                    out[i].replies.push(view);
                }
            }
        }
    }

    out
}

pub async fn add_comment(
    state: &AppState,
    actor_id: Uuid,
    story_id: Uuid,
    content: &str,
    parent_id: Option<Uuid>,
) -> ApiResult<Comment> {
    if content.trim().is_empty() {
        return Err(ApiError::validation("comment must not be empty"));
    }

    let story = stories::repo::find(&state.db, story_id)
        .await?
        .ok_or_else(|| ApiError::not_found("story not found"))?;

    let parent = match parent_id {
        Some(pid) => {
            let parent = repo::find(&state.db, pid)
                .await?
                .ok_or_else(|| ApiError::not_found("parent comment not found"))?;
            validate_parent(&parent, story_id)?;
            Some(parent)
        }
        None => None,
    };

    let actor = User::find_by_id(&state.db, actor_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user no longer exists".into()))?;

    // Comment and its notification land atomically.
    let mut tx = state.db.begin().await?;
    let comment = repo::insert_tx(&mut tx, actor_id, story_id, parent_id, content).await?;

    let (target, kind) = match &parent {
        Some(p) => (p.user_id, NotificationKind::Reply),
        None => (story.user_id, NotificationKind::NewComment),
    };
    if target != actor_id {
        notify_tx(
            &mut tx,
            target,
            kind,
            &actor.username,
            Some(story_id),
            Some(comment.id),
        )
        .await?;
    }
    tx.commit().await?;

    info!(comment_id = %comment.id, story_id = %story_id, user_id = %actor_id, "comment added");
    Ok(comment)
}

pub async fn delete_comment(state: &AppState, actor_id: Uuid, comment_id: Uuid) -> ApiResult<()> {
    let comment = repo::find(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("comment not found"))?;
    if comment.user_id != actor_id {
        return Err(ApiError::forbidden("you cannot delete this comment"));
    }

    let mut tx = state.db.begin().await?;
    repo::delete_cascade_tx(&mut tx, comment_id).await?;
    tx.commit().await?;

    info!(comment_id = %comment_id, user_id = %actor_id, "comment deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};

    fn row(
        id: Uuid,
        parent_id: Option<Uuid>,
        user_id: Uuid,
        author: &str,
        at: OffsetDateTime,
    ) -> CommentRow {
        CommentRow {
            id,
            user_id,
            story_id: Uuid::new_v4(),
            parent_id,
            content: format!("comment {id}"),
            created_at: at,
            author_username: author.into(),
            like_count: 0,
        }
    }

    #[test]
    fn tree_groups_replies_under_parents_in_order() {
        let t0 = OffsetDateTime::now_utc();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let (r1, r2) = (Uuid::new_v4(), Uuid::new_v4());
        let user = Uuid::new_v4();

        // Flat list, oldest first, replies interleaved with the second
        // top-level comment.
        let rows = vec![
            row(a, None, user, "alice", t0),
            row(r1, Some(a), user, "bob", t0 + Duration::seconds(1)),
            row(b, None, user, "carol", t0 + Duration::seconds(2)),
            row(r2, Some(a), user, "dave", t0 + Duration::seconds(3)),
        ];

        let tree = build_tree(rows, None, &HashSet::new());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, a);
        assert_eq!(tree[1].id, b);
        assert_eq!(tree[0].replies.len(), 2);
        assert_eq!(tree[0].replies[0].id, r1);
        assert_eq!(tree[0].replies[1].id, r2);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn tree_marks_viewer_flags() {
        let t0 = OffsetDateTime::now_utc();
        let me = Uuid::new_v4();
        let c = Uuid::new_v4();
        let rows = vec![row(c, None, me, "me", t0)];

        let mut liked = HashSet::new();
        liked.insert(c);

        let tree = build_tree(rows, Some(me), &liked);
        assert!(tree[0].user_has_liked);
        assert!(tree[0].can_delete);
    }

    #[test]
    fn parent_must_be_top_level_and_same_story() {
        let story = Uuid::new_v4();
        let base = Comment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            story_id: story,
            parent_id: None,
            content: "top".into(),
            created_at: OffsetDateTime::now_utc(),
        };

        assert!(validate_parent(&base, story).is_ok());

        let other_story = Comment {
            story_id: Uuid::new_v4(),
            ..base.clone()
        };
        assert!(matches!(
            validate_parent(&other_story, story).unwrap_err(),
            ApiError::Validation(_)
        ));

        let nested = Comment {
            parent_id: Some(Uuid::new_v4()),
            ..base
        };
        assert!(matches!(
            validate_parent(&nested, story).unwrap_err(),
            ApiError::Validation(_)
        ));
    }
}
