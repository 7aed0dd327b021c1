use serde::Serialize;
use sqlx::FromRow;

/// A friend-list or request-list row: the counterpart user plus the
/// friendship row id the client needs for accept/cancel/remove calls.
#[derive(FromRow, Clone, Debug, Serialize)]
pub struct FriendSqlxModel {
    pub friendship_id: i32,
    pub id: i32,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "foto_perfil")]
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "estado")]
    pub presence: String,
}
