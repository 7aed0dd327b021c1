use serde::Serialize;

/// Result of the posts/like toggle.
#[derive(Serialize, Clone)]
pub struct PostLikePayload {
    pub action: &'static str,
    pub total_likes: i64,
}

impl PostLikePayload {
    pub fn from_toggle(liked: bool, total_likes: i64) -> Self {
        Self {
            action: if liked { "liked" } else { "unliked" },
            total_likes,
        }
    }
}

/// Result of the likes/toggle alias, which reports a boolean instead.
#[derive(Serialize, Clone)]
pub struct LikeTogglePayload {
    pub liked: bool,
    pub total_likes: i64,
}
