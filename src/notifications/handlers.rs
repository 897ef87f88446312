use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{NotificationView, UnreadCountResponse};
use super::repo;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications", delete(clear_notifications))
        .route("/notifications/unread_count", get(unread_count))
        .route("/notifications/:id", delete(delete_notification))
}

/// Opening the list is what marks everything read (read-on-view), so the
/// unread badge clears as soon as the user looks at the feed.
#[instrument(skip(state))]
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<NotificationView>>> {
    repo::mark_all_read(&state.db, user_id).await?;
    let items = repo::list_for_user(&state.db, user_id).await?;
    Ok(Json(items.into_iter().map(NotificationView::from).collect()))
}

#[instrument(skip(state))]
pub async fn unread_count(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let count = repo::count_unread(&state.db, user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

#[instrument(skip(state))]
pub async fn delete_notification(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let notification = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("notification not found"))?;
    if notification.user_id != user_id {
        return Err(ApiError::forbidden("you cannot delete this notification"));
    }

    repo::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn clear_notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<StatusCode> {
    let removed = repo::delete_all_for_user(&state.db, user_id).await?;
    info!(user_id = %user_id, removed, "notifications cleared");
    Ok(StatusCode::NO_CONTENT)
}
