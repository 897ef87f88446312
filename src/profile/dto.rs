use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct RecentStory {
    pub id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Profile page numbers plus the author's latest posts.
#[derive(Debug, Serialize)]
pub struct ProfileStats {
    pub story_count: i64,
    pub likes_received: i64,
    pub comment_count: i64,
    pub recent_stories: Vec<RecentStory>,
}
