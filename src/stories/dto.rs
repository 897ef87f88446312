use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::comments::dto::CommentView;

/// How stories are ordered on the front page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoryCategory {
    #[default]
    Latest,
    Popular,
}

#[derive(Debug, Deserialize)]
pub struct ListStoriesQuery {
    #[serde(default)]
    pub category: StoryCategory,
    #[serde(default = "crate::stories::dto::first_page")]
    pub page: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "crate::stories::dto::first_page")]
    pub page: i64,
}

pub(crate) fn first_page() -> i64 {
    1
}

/// Story as rendered in lists and search results.
#[derive(Debug, Serialize)]
pub struct StoryItem {
    pub id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    /// "Anonymous" when the author chose to hide their name.
    pub author_name: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub user_has_liked: bool,
    pub can_delete: bool,
}

/// Story detail page: the story plus its comment tree.
#[derive(Debug, Serialize)]
pub struct StoryDetail {
    #[serde(flatten)]
    pub story: StoryItem,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CreatedStoryResponse {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_defaults_to_latest() {
        let q: ListStoriesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.category, StoryCategory::Latest);
        assert_eq!(q.page, 1);

        let q: ListStoriesQuery =
            serde_json::from_str(r#"{"category":"popular","page":2}"#).unwrap();
        assert_eq!(q.category, StoryCategory::Popular);
        assert_eq!(q.page, 2);
    }
}
