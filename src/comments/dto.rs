use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
    /// Present when replying to an existing top-level comment.
    pub parent_id: Option<Uuid>,
}

/// Comment as rendered on the story page. Replies are carried inline;
/// they are always one level deep.
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub author_name: String,
    pub like_count: i64,
    pub user_has_liked: bool,
    pub can_delete: bool,
    pub replies: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CreatedCommentResponse {
    pub id: Uuid,
    pub story_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}
