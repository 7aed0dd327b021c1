use crate::post::ActiveModel;
use sea_orm::DeriveIntoActiveModel;
use serde::Serialize;
use sqlx::types::chrono::NaiveDateTime;
use sqlx::FromRow;

#[derive(DeriveIntoActiveModel, Clone, Debug)]
pub struct PostModel {
    pub user_id: i32,
    pub content: String,
    pub image_url: Option<String>,
    pub song_name: Option<String>,
    pub song_artist: Option<String>,
    pub song_url: Option<String>,
    pub song_id: Option<i32>,
    pub location: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Feed row: the post joined with its author plus the read-time counters
/// (correlated subqueries, not stored values).
#[derive(FromRow, Clone, Debug, Serialize)]
pub struct PostSqlxModel {
    pub id: i32,
    #[serde(rename = "usuario_id")]
    pub user_id: i32,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "imagen_url")]
    pub image_url: Option<String>,
    #[serde(rename = "cancion_nombre")]
    pub song_name: Option<String>,
    #[serde(rename = "cancion_artista")]
    pub song_artist: Option<String>,
    #[serde(rename = "cancion_url")]
    pub song_url: Option<String>,
    #[serde(rename = "cancion_id")]
    pub song_id: Option<i32>,
    #[serde(rename = "ubicacion")]
    pub location: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "foto_perfil")]
    pub avatar_url: Option<String>,
    pub total_likes: i64,
    #[serde(rename = "total_comentarios")]
    pub total_comments: i64,
}

#[derive(FromRow, Clone, Debug, Serialize)]
pub struct CommentSqlxModel {
    pub id: i32,
    pub post_id: i32,
    #[serde(rename = "usuario_id")]
    pub user_id: i32,
    #[serde(rename = "contenido")]
    pub content: String,
    pub created_at: NaiveDateTime,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "foto_perfil")]
    pub avatar_url: Option<String>,
}
