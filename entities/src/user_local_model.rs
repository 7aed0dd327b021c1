use crate::user::ActiveModel;
use sea_orm::DeriveIntoActiveModel;
use serde::Serialize;
use sqlx::types::chrono::NaiveDateTime;
use sqlx::FromRow;

/// Insert shape for registration. Presence is left to its column default
/// (`offline`) until the first login flips it.
#[derive(DeriveIntoActiveModel, Clone, Debug)]
pub struct UserModel {
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub email: String,
    pub created_at: NaiveDateTime,
    pub last_access_at: NaiveDateTime,
}

/// Public user row as read by search/profile queries. `email` is selected as
/// NULL by the search query so it never leaves the server there.
#[derive(FromRow, Clone, Debug, Serialize)]
pub struct UserSqlxModel {
    pub id: i32,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "foto_perfil")]
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "genero_favorito")]
    pub favorite_genre: Option<String>,
    #[serde(rename = "cancion_estado")]
    pub status_song: Option<String>,
    #[serde(rename = "estado")]
    pub presence: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UserStatsModel {
    pub total_posts: i64,
    pub total_friends: i64,
    pub total_likes_received: i64,
}
