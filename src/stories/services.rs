use std::collections::HashSet;

use axum::extract::Multipart;
use bytes::Bytes;
use uuid::Uuid;

use super::dto::StoryItem;
use super::repo::StoryListRow;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::uploads;

pub const MAX_CONTENT_CHARS: usize = 1000;

/// Trims and bounds story content. The 1000-character limit applies to
/// stories only, not comments.
pub fn validate_content(content: &str) -> ApiResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("content must not be empty"));
    }
    if trimmed.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::validation(
            "content too long, maximum is 1000 characters",
        ));
    }
    Ok(trimmed.to_string())
}

/// Fields accepted by the create and edit story forms.
#[derive(Default)]
pub struct StoryForm {
    pub content: String,
    pub is_anonymous: bool,
    pub remove_image: bool,
    pub image: Option<(Bytes, String)>,
}

fn truthy(v: &str) -> bool {
    matches!(v, "true" | "on" | "1")
}

pub async fn parse_story_form(mut mp: Multipart) -> ApiResult<StoryForm> {
    let mut form = StoryForm::default();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        match name.as_str() {
            "content" => {
                form.content = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(e.to_string()))?;
            }
            "is_anonymous" => {
                let v = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(e.to_string()))?;
                form.is_anonymous = truthy(&v);
            }
            "remove_image" => {
                let v = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(e.to_string()))?;
                form.remove_image = truthy(&v);
            }
            "image" => {
                // An image field with no filename is an empty file input.
                if field.file_name().map_or(true, |f| f.is_empty()) {
                    continue;
                }
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(e.to_string()))?;
                form.image = Some((data, content_type));
            }
            _ => {}
        }
    }
    Ok(form)
}

pub fn author_name(username: &str, is_anonymous: bool) -> String {
    if is_anonymous {
        "Anonymous".to_string()
    } else {
        username.to_string()
    }
}

/// Builds the client-facing story item, presigning the image when present.
pub async fn row_to_item(
    st: &AppState,
    row: StoryListRow,
    viewer: Option<Uuid>,
    liked: &HashSet<Uuid>,
) -> StoryItem {
    let image_url = match &row.image_key {
        Some(key) => uploads::presign_story_image(st, key).await,
        None => None,
    };
    StoryItem {
        id: row.id,
        content: row.content,
        is_anonymous: row.is_anonymous,
        image_url,
        created_at: row.created_at,
        author_name: author_name(&row.author_username, row.is_anonymous),
        like_count: row.like_count,
        comment_count: row.comment_count,
        user_has_liked: liked.contains(&row.id),
        can_delete: viewer == Some(row.user_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn content_is_trimmed() {
        assert_eq!(validate_content("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn empty_and_whitespace_content_rejected() {
        assert!(matches!(
            validate_content("").unwrap_err(),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            validate_content("   \n\t ").unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn length_limit_is_exactly_1000_chars() {
        let ok = "a".repeat(1000);
        assert_eq!(validate_content(&ok).unwrap().len(), 1000);

        let too_long = "a".repeat(1001);
        assert!(matches!(
            validate_content(&too_long).unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn length_limit_counts_characters_not_bytes() {
        // 1000 multibyte characters are within the limit.
        let ok = "é".repeat(1000);
        assert!(validate_content(&ok).is_ok());
    }

    #[test]
    fn anonymous_stories_hide_the_author() {
        assert_eq!(author_name("alice", true), "Anonymous");
        assert_eq!(author_name("alice", false), "alice");
    }

    #[test]
    fn checkbox_values() {
        assert!(truthy("true"));
        assert!(truthy("on"));
        assert!(truthy("1"));
        assert!(!truthy("false"));
        assert!(!truthy(""));
    }

    #[tokio::test]
    async fn row_to_item_sets_flags_for_viewer() {
        let st = AppState::fake();
        let owner = Uuid::new_v4();
        let story_id = Uuid::new_v4();
        let row = StoryListRow {
            id: story_id,
            user_id: owner,
            content: "hi".into(),
            is_anonymous: false,
            image_key: None,
            created_at: OffsetDateTime::now_utc(),
            author_username: "bob".into(),
            like_count: 2,
            comment_count: 1,
        };

        let mut liked = HashSet::new();
        liked.insert(story_id);

        let item = row_to_item(&st, row.clone(), Some(owner), &liked).await;
        assert!(item.user_has_liked);
        assert!(item.can_delete);
        assert_eq!(item.author_name, "bob");

        let item = row_to_item(&st, row, Some(Uuid::new_v4()), &HashSet::new()).await;
        assert!(!item.user_has_liked);
        assert!(!item.can_delete);
    }
}
