use chrono::NaiveDateTime;
use entities::user::{self, Presence};
use serde::Serialize;

/// The user fields handed back by login/check-session.
#[derive(Serialize, Clone)]
pub struct UserPayload {
    pub user_id: i32,
    pub usuario: String,
    pub nombre: String,
    pub correo: String,
    pub foto_perfil: Option<String>,
}

impl From<&user::Model> for UserPayload {
    fn from(user: &user::Model) -> Self {
        Self {
            user_id: user.id,
            usuario: user.username.to_owned(),
            nombre: user.name.to_owned(),
            correo: user.email.to_owned(),
            foto_perfil: user.avatar_url.to_owned(),
        }
    }
}

#[derive(Serialize, Clone)]
pub struct RegisteredPayload {
    pub user_id: i32,
    pub usuario: String,
}

#[derive(Serialize, Clone)]
pub struct LoginPayload {
    pub user_id: i32,
    pub usuario: String,
    pub nombre: String,
    pub correo: String,
    pub foto_perfil: Option<String>,
    pub token: String,
}

impl LoginPayload {
    pub fn new(user: &user::Model, token: String) -> Self {
        Self {
            user_id: user.id,
            usuario: user.username.to_owned(),
            nombre: user.name.to_owned(),
            correo: user.email.to_owned(),
            foto_perfil: user.avatar_url.to_owned(),
            token,
        }
    }
}

#[derive(Serialize, Clone)]
pub struct SessionStatePayload {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPayload>,
}

/// Full profile view. Unlike search results, the profile keeps the email.
#[derive(Serialize, Clone)]
pub struct ProfilePayload {
    pub id: i32,
    pub usuario: String,
    pub nombre: String,
    pub correo: String,
    pub foto_perfil: Option<String>,
    pub bio: Option<String>,
    pub genero_favorito: Option<String>,
    pub cancion_estado: Option<String>,
    pub estado: Presence,
    pub created_at: NaiveDateTime,
}

impl From<&user::Model> for ProfilePayload {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            usuario: user.username.to_owned(),
            nombre: user.name.to_owned(),
            correo: user.email.to_owned(),
            foto_perfil: user.avatar_url.to_owned(),
            bio: user.bio.to_owned(),
            genero_favorito: user.favorite_genre.to_owned(),
            cancion_estado: user.status_song.to_owned(),
            estado: user.presence,
            created_at: user.created_at,
        }
    }
}
