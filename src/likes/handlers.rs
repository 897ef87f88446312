use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::services::{self, LikeToggle};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stories/:id/like", post(toggle_story_like))
        .route("/comments/:id/like", post(toggle_comment_like))
}

#[instrument(skip(state))]
pub async fn toggle_story_like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(story_id): Path<Uuid>,
) -> ApiResult<Json<LikeToggle>> {
    let toggled = services::toggle_story_like(&state, user_id, story_id).await?;
    Ok(Json(toggled))
}

#[instrument(skip(state))]
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<Json<LikeToggle>> {
    let toggled = services::toggle_comment_like(&state, user_id, comment_id).await?;
    Ok(Json(toggled))
}
