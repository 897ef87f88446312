use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{AddCommentRequest, CreatedCommentResponse};
use super::services;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stories/:id/comments", post(add_comment))
        .route("/comments/:id", delete(delete_comment))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(story_id): Path<Uuid>,
    Json(payload): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<CreatedCommentResponse>)> {
    let comment = services::add_comment(
        &state,
        user_id,
        story_id,
        &payload.content,
        payload.parent_id,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedCommentResponse {
            id: comment.id,
            story_id: comment.story_id,
            parent_id: comment.parent_id,
            created_at: comment.created_at,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services::delete_comment(&state, user_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
