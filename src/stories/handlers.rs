use std::collections::HashSet;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    CreatedStoryResponse, ListStoriesQuery, SearchQuery, StoryCategory, StoryDetail, StoryItem,
};
use super::{repo, services};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::comments;
use crate::error::{ApiError, ApiResult};
use crate::likes;
use crate::pagination::{offset_for, Page, PER_PAGE};
use crate::state::AppState;
use crate::uploads;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/stories", get(list_stories))
        .route("/stories/search", get(search_stories))
        .route("/stories/:id", get(story_detail))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/stories", post(create_story))
        .route("/stories/:id", put(edit_story))
        .route("/stories/:id", delete(delete_story))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB, images included
}

async fn liked_story_ids(
    state: &AppState,
    viewer: Option<Uuid>,
    rows: &[repo::StoryListRow],
) -> ApiResult<HashSet<Uuid>> {
    match viewer {
        Some(user_id) => {
            let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
            Ok(likes::repo::story_ids_liked_by(&state.db, user_id, &ids).await?)
        }
        None => Ok(HashSet::new()),
    }
}

#[instrument(skip(state))]
pub async fn list_stories(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(q): Query<ListStoriesQuery>,
) -> ApiResult<Json<Page<StoryItem>>> {
    let page = q.page.max(1);
    let offset = offset_for(page);

    let rows = match q.category {
        StoryCategory::Latest => repo::list_latest(&state.db, PER_PAGE, offset).await?,
        StoryCategory::Popular => repo::list_popular(&state.db, PER_PAGE, offset).await?,
    };
    let total = repo::count_all(&state.db).await?;

    let liked = liked_story_ids(&state, viewer, &rows).await?;
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(services::row_to_item(&state, row, viewer, &liked).await);
    }

    Ok(Json(Page::new(items, page, total)))
}

#[instrument(skip(state))]
pub async fn search_stories(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<Page<StoryItem>>> {
    let query = q.q.trim();
    let page = q.page.max(1);
    if query.is_empty() {
        return Ok(Json(Page::new(Vec::new(), page, 0)));
    }

    let offset = offset_for(page);
    let rows = repo::search(&state.db, query, PER_PAGE, offset).await?;
    let total = repo::count_search(&state.db, query).await?;

    let liked = liked_story_ids(&state, viewer, &rows).await?;
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(services::row_to_item(&state, row, viewer, &liked).await);
    }

    Ok(Json(Page::new(items, page, total)))
}

#[instrument(skip(state))]
pub async fn story_detail(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StoryDetail>> {
    let row = repo::find_row(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("story not found"))?;

    let liked = liked_story_ids(&state, viewer, std::slice::from_ref(&row)).await?;
    let story = services::row_to_item(&state, row, viewer, &liked).await;

    let comment_rows = comments::repo::list_rows_for_story(&state.db, id).await?;
    let liked_comments = match viewer {
        Some(user_id) => {
            let ids: Vec<Uuid> = comment_rows.iter().map(|c| c.id).collect();
            likes::repo::comment_ids_liked_by(&state.db, user_id, &ids).await?
        }
        None => HashSet::new(),
    };
    let tree = comments::services::build_tree(comment_rows, viewer, &liked_comments);

    Ok(Json(StoryDetail {
        story,
        comments: tree,
    }))
}

#[instrument(skip(state, mp))]
pub async fn create_story(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Multipart,
) -> ApiResult<(StatusCode, HeaderMap, Json<CreatedStoryResponse>)> {
    let form = services::parse_story_form(mp).await?;
    let content = services::validate_content(&form.content)?;

    // A provided image that fails validation aborts the whole post; it is
    // never silently dropped.
    let image_key = match form.image {
        Some((body, content_type)) => {
            Some(uploads::store_story_image(&state, user_id, body, &content_type).await?)
        }
        None => None,
    };

    let story = repo::insert(
        &state.db,
        user_id,
        &content,
        form.is_anonymous,
        image_key.as_deref(),
    )
    .await?;

    info!(story_id = %story.id, user_id = %user_id, "story created");

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/stories/{}", story.id)
            .parse()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("location header: {e}")))?,
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedStoryResponse {
            id: story.id,
            created_at: story.created_at,
        }),
    ))
}

#[instrument(skip(state, mp))]
pub async fn edit_story(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> ApiResult<Json<StoryItem>> {
    let story = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("story not found"))?;
    if story.user_id != user_id {
        return Err(ApiError::forbidden("you cannot edit this story"));
    }

    let form = services::parse_story_form(mp).await?;
    let content = services::validate_content(&form.content)?;

    // Store the replacement first so an upload failure leaves the story
    // untouched; the old object is removed only after the row is updated.
    let (image_key, old_to_delete) = match form.image {
        Some((body, content_type)) => {
            let key = uploads::store_story_image(&state, user_id, body, &content_type).await?;
            (Some(key), story.image_key.clone())
        }
        None if form.remove_image => (None, story.image_key.clone()),
        None => (story.image_key.clone(), None),
    };

    repo::update(&state.db, id, &content, form.is_anonymous, image_key.as_deref()).await?;

    if let Some(old_key) = old_to_delete {
        uploads::delete_story_image(&state, &old_key).await;
    }

    info!(story_id = %id, user_id = %user_id, "story updated");

    let row = repo::find_row(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("story not found"))?;
    let liked = liked_story_ids(&state, Some(user_id), std::slice::from_ref(&row)).await?;
    Ok(Json(
        services::row_to_item(&state, row, Some(user_id), &liked).await,
    ))
}

#[instrument(skip(state))]
pub async fn delete_story(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let story = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("story not found"))?;
    if story.user_id != user_id {
        return Err(ApiError::forbidden("you cannot delete this story"));
    }

    let mut tx = state.db.begin().await?;
    repo::delete_cascade_tx(&mut tx, id).await?;
    tx.commit().await?;

    // Best-effort: the database state is already consistent.
    if let Some(key) = &story.image_key {
        uploads::delete_story_image(&state, key).await;
    }

    info!(story_id = %id, user_id = %user_id, "story deleted");
    Ok(StatusCode::NO_CONTENT)
}
