use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{ProfileStats, RecentStory};
use super::repo;
use crate::auth::AuthUser;
use crate::comments;
use crate::error::ApiResult;
use crate::likes;
use crate::state::AppState;
use crate::stories;
use crate::uploads;

const RECENT_STORIES: i64 = 5;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile/stats", get(profile_stats))
}

#[instrument(skip(state))]
pub async fn profile_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<ProfileStats>> {
    let story_count = repo::count_stories_by_user(&state.db, user_id).await?;
    let likes_received = likes::repo::count_likes_received(&state.db, user_id).await?;
    let comment_count = comments::repo::count_by_user(&state.db, user_id).await?;

    let recent = stories::repo::recent_by_user(&state.db, user_id, RECENT_STORIES).await?;
    let mut recent_stories = Vec::with_capacity(recent.len());
    for story in recent {
        let image_url = match &story.image_key {
            Some(key) => uploads::presign_story_image(&state, key).await,
            None => None,
        };
        recent_stories.push(RecentStory {
            id: story.id,
            content: story.content,
            is_anonymous: story.is_anonymous,
            image_url,
            created_at: story.created_at,
        });
    }

    Ok(Json(ProfileStats {
        story_count,
        likes_received,
        comment_count,
        recent_stories,
    }))
}
