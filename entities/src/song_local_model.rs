use crate::song::ActiveModel;
use sea_orm::DeriveIntoActiveModel;
use serde::Serialize;
use sqlx::types::chrono::NaiveDateTime;
use sqlx::FromRow;

#[derive(DeriveIntoActiveModel, Clone, Debug)]
pub struct SongModel {
    pub user_id: i32,
    pub title: String,
    pub artist: String,
    pub genre: Option<String>,
    pub file_url: String,
    pub cover_url: Option<String>,
    pub duration: i32,
    pub file_size: i64,
    pub play_count: i32,
    pub like_count: i32,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Song row joined with its uploader. `total_likes` is the denormalized
/// counter aliased for the wire.
#[derive(FromRow, Clone, Debug, Serialize)]
pub struct SongSqlxModel {
    pub id: i32,
    #[serde(rename = "usuario_id")]
    pub user_id: i32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "artista")]
    pub artist: String,
    #[serde(rename = "genero")]
    pub genre: Option<String>,
    #[serde(rename = "archivo_url")]
    pub file_url: String,
    #[serde(rename = "portada_url")]
    pub cover_url: Option<String>,
    #[serde(rename = "duracion")]
    pub duration: i32,
    pub file_size: i64,
    #[serde(rename = "reproducciones")]
    pub play_count: i32,
    pub total_likes: i32,
    pub created_at: NaiveDateTime,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "nombre")]
    pub name: String,
}
