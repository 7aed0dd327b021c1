use serde::Serialize;

/// Answer to `check-friendship`: the pair's state plus enough context for
/// the client to render "sent" vs "received" for a pending request.
#[derive(Serialize, Clone)]
pub struct FriendshipStatusPayload {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendship_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiated_by: Option<i32>,
}

impl FriendshipStatusPayload {
    pub fn none() -> Self {
        Self {
            status: "none".to_string(),
            message: "No relationship with this user".to_string(),
            friendship_id: None,
            initiated_by: None,
        }
    }
}

#[derive(Serialize, Clone)]
pub struct RequestCreatedPayload {
    pub request_id: i32,
}

#[derive(Serialize, Clone)]
pub struct FriendshipIdPayload {
    pub friendship_id: i32,
}
