use serde::Serialize;

#[derive(Serialize, Clone)]
pub struct UploadPayload {
    pub song_id: i32,
    pub archivo_url: String,
    pub duracion: i32,
}

#[derive(Serialize, Clone)]
pub struct SongLikePayload {
    pub liked: bool,
    pub total_likes: i32,
}
