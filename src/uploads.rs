use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Maps an accepted image content type to a file extension. Anything not
/// listed here is rejected, which the caller must surface as a validation
/// failure rather than silently storing nothing.
fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Stores a story image and returns the object key recorded on the story.
pub async fn store_story_image(
    st: &AppState,
    user_id: Uuid,
    body: Bytes,
    content_type: &str,
) -> ApiResult<String> {
    let ext = ext_from_mime(content_type).ok_or_else(|| {
        ApiError::validation("unsupported image format, use JPG, PNG or GIF")
    })?;
    let key = format!("stories/{}/{}.{}", user_id, Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, body, content_type)
        .await
        .map_err(ApiError::Internal)?;
    Ok(key)
}

/// Removes a replaced or orphaned image. Failure is logged and swallowed;
/// the owning operation has already committed.
pub async fn delete_story_image(st: &AppState, key: &str) {
    if let Err(e) = st.storage.delete_object(key).await {
        warn!(error = %e, key, "failed to delete old story image");
    }
}

const PRESIGN_TTL_SECS: u64 = 30 * 60;

pub async fn presign_story_image(st: &AppState, key: &str) -> Option<String> {
    match st.storage.presign_get(key, PRESIGN_TTL_SECS).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, key, "presign failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn accepted_image_types() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/gif"), Some("gif"));
        assert_eq!(ext_from_mime("image/webp"), None);
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[tokio::test]
    async fn store_rejects_unsupported_format() {
        let state = AppState::fake();
        let err = store_story_image(
            &state,
            Uuid::new_v4(),
            Bytes::from_static(b"not an image"),
            "text/plain",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn store_returns_key_under_user_prefix() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let key = store_story_image(&state, user, Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert!(key.starts_with(&format!("stories/{}/", user)));
        assert!(key.ends_with(".png"));
    }

    #[tokio::test]
    async fn delete_never_fails() {
        let state = AppState::fake();
        delete_story_image(&state, "stories/x/y.png").await;
    }

    #[tokio::test]
    async fn presign_uses_storage_backend() {
        let state = AppState::fake();
        let url = presign_story_image(&state, "stories/a/b.jpg").await.unwrap();
        assert!(url.contains("stories/a/b.jpg"));
    }
}
