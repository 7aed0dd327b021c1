use axum::extract::{Extension, Query, Request, State};
use axum::response::Response;
use log::error;
use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait, IntoActiveModel};
use serde::Deserialize;

use entities::prelude::User;
use entities::user::Presence;

use crate::auth_middleware::CurrentUser;
use crate::handlers::{extract_json, friend_handlers, unknown_action};
use crate::responses::responses::{
    failure_response, message_response, ok_response, ok_with_count, server_error_response,
};
use crate::responses::user_response::ProfilePayload;
use crate::sanitize;
use crate::AppState;

#[derive(Deserialize)]
pub struct UserQuery {
    pub action: Option<String>,
    pub user_id: Option<i32>,
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub nombre: Option<String>,
    pub bio: Option<String>,
    pub genero_favorito: Option<String>,
    pub cancion_estado: Option<String>,
    pub foto_perfil: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub clave_actual: String,
    pub clave_nueva: String,
}

#[derive(Deserialize)]
pub struct UpdatePresenceRequest {
    pub estado: Presence,
}

#[derive(Deserialize)]
pub struct FriendIdRequest {
    pub friend_id: i32,
}

#[derive(Deserialize)]
pub struct RequestIdRequest {
    pub request_id: i32,
}

#[derive(Deserialize)]
pub struct FriendshipIdRequest {
    pub friendship_id: i32,
}

#[derive(Deserialize)]
pub struct UserIdRequest {
    pub user_id: i32,
}

pub async fn users_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<UserQuery>,
) -> Response {
    match query.action.as_deref() {
        Some("profile") => profile(&state, query.user_id.unwrap_or(current.id)).await,
        Some("search") => search(&state, query.q.as_deref(), query.limit).await,
        Some("stats") => {
            let stats =
                queries::get_user_stats(&state.pool, query.user_id.unwrap_or(current.id)).await;
            ok_response(stats)
        }
        Some("check-friendship") => match query.user_id {
            Some(other) => friend_handlers::check_friendship(&state, &current, other).await,
            None => failure_response("user_id is required"),
        },
        Some("friends") => {
            match queries::get_friends_list(&state.pool, query.user_id.unwrap_or(current.id)).await
            {
                Ok(friends) => {
                    let count = friends.len() as u64;
                    ok_with_count(friends, count)
                }
                Err(err) => {
                    error!("friends list failed: {}", err);
                    server_error_response()
                }
            }
        }
        Some("friend-requests") => {
            match queries::get_pending_requests(&state.pool, current.id).await {
                Ok(requests) => {
                    let count = requests.len() as u64;
                    ok_with_count(requests, count)
                }
                Err(err) => {
                    error!("pending requests failed: {}", err);
                    server_error_response()
                }
            }
        }
        other => unknown_action("users", other),
    }
}

pub async fn users_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<UserQuery>,
    request: Request,
) -> Response {
    match query.action.as_deref() {
        Some("update-profile") => {
            let body = match extract_json::<UpdateProfileRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            update_profile(&state, &current, body).await
        }
        Some("change-password") => {
            let body = match extract_json::<ChangePasswordRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            change_password(&state, &current, body).await
        }
        Some("update-presence") => {
            let body = match extract_json::<UpdatePresenceRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            update_presence(&state, &current, body.estado).await
        }
        Some("send-friend-request") => {
            let body = match extract_json::<FriendIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            friend_handlers::send_friend_request(&state, &current, body.friend_id).await
        }
        Some("accept-friend-request") => {
            let body = match extract_json::<RequestIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            friend_handlers::accept_friend_request(&state, &current, body.request_id).await
        }
        Some("reject-friend-request") => {
            let body = match extract_json::<RequestIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            friend_handlers::reject_friend_request(&state, &current, body.request_id).await
        }
        Some("cancel-friend-request") => {
            let body = match extract_json::<RequestIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            friend_handlers::cancel_friend_request(&state, &current, body.request_id).await
        }
        Some("remove-friend") => {
            let body = match extract_json::<FriendshipIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            friend_handlers::remove_friend(&state, &current, body.friendship_id).await
        }
        Some("block-user") => {
            let body = match extract_json::<UserIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            friend_handlers::block_user(&state, &current, body.user_id).await
        }
        other => unknown_action("users", other),
    }
}

async fn profile(state: &AppState, user_id: i32) -> Response {
    match User::find_by_id(user_id).one(&state.connection).await {
        Ok(Some(user_row)) => ok_response(ProfilePayload::from(&user_row)),
        Ok(None) => failure_response("User not found"),
        Err(err) => {
            error!("profile lookup failed: {}", err);
            server_error_response()
        }
    }
}

async fn search(state: &AppState, term: Option<&str>, limit: Option<i64>) -> Response {
    let term = term.map(str::trim).unwrap_or("");
    if term.is_empty() {
        return failure_response("Search term is required");
    }
    let (limit, _) = queries::clamp_page(limit, None);

    match queries::search_users(&state.pool, term, limit).await {
        Ok(users) => {
            let count = users.len() as u64;
            ok_with_count(users, count)
        }
        Err(err) => {
            error!("user search failed: {}", err);
            server_error_response()
        }
    }
}

/// Sparse profile update over a fixed set of columns; only the supplied
/// fields change, each sanitized on the way in.
async fn update_profile(
    state: &AppState,
    current: &CurrentUser,
    body: UpdateProfileRequest,
) -> Response {
    if body.nombre.is_none()
        && body.bio.is_none()
        && body.genero_favorito.is_none()
        && body.cancion_estado.is_none()
        && body.foto_perfil.is_none()
    {
        return failure_response("No fields to update");
    }

    let user_row = match User::find_by_id(current.id).one(&state.connection).await {
        Ok(Some(user_row)) => user_row,
        Ok(None) => return failure_response("User not found"),
        Err(err) => {
            error!("profile load failed: {}", err);
            return server_error_response();
        }
    };

    let mut changes = user_row.into_active_model();
    if let Some(nombre) = body.nombre {
        let nombre = sanitize::sanitize_text(&nombre);
        if nombre.is_empty() {
            return failure_response("Name cannot be empty");
        }
        changes.name = ActiveValue::Set(nombre);
    }
    if let Some(bio) = body.bio {
        changes.bio = ActiveValue::Set(sanitize::sanitize_opt(Some(bio)));
    }
    if let Some(genre) = body.genero_favorito {
        changes.favorite_genre = ActiveValue::Set(sanitize::sanitize_opt(Some(genre)));
    }
    if let Some(status_song) = body.cancion_estado {
        changes.status_song = ActiveValue::Set(sanitize::sanitize_opt(Some(status_song)));
    }
    if let Some(avatar) = body.foto_perfil {
        changes.avatar_url = ActiveValue::Set(sanitize::sanitize_opt(Some(avatar)));
    }

    match changes.update(&state.connection).await {
        Ok(updated) => ok_response(ProfilePayload::from(&updated)),
        Err(err) => {
            error!("profile update failed: {}", err);
            server_error_response()
        }
    }
}

async fn update_presence(state: &AppState, current: &CurrentUser, estado: Presence) -> Response {
    let user_row = match User::find_by_id(current.id).one(&state.connection).await {
        Ok(Some(user_row)) => user_row,
        Ok(None) => return failure_response("User not found"),
        Err(err) => {
            error!("presence load failed: {}", err);
            return server_error_response();
        }
    };

    let mut changes = user_row.into_active_model();
    changes.presence = ActiveValue::Set(estado);
    match changes.update(&state.connection).await {
        Ok(_) => message_response("Presence updated"),
        Err(err) => {
            error!("presence update failed: {}", err);
            server_error_response()
        }
    }
}

async fn change_password(
    state: &AppState,
    current: &CurrentUser,
    body: ChangePasswordRequest,
) -> Response {
    let user_row = match User::find_by_id(current.id).one(&state.connection).await {
        Ok(Some(user_row)) => user_row,
        Ok(None) => return failure_response("User not found"),
        Err(err) => {
            error!("password change load failed: {}", err);
            return server_error_response();
        }
    };

    if !bcrypt::verify(&body.clave_actual, &user_row.password_hash).unwrap_or(false) {
        return failure_response("Current password is incorrect");
    }
    if let Err(message) = sanitize::validate_password(&body.clave_nueva) {
        return failure_response(message);
    }

    let password_hash = match bcrypt::hash(&body.clave_nueva, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(err) => {
            error!("password hashing failed: {}", err);
            return server_error_response();
        }
    };

    let mut changes = user_row.into_active_model();
    changes.password_hash = ActiveValue::Set(password_hash);
    match changes.update(&state.connection).await {
        Ok(_) => message_response("Password updated"),
        Err(err) => {
            error!("password update failed: {}", err);
            server_error_response()
        }
    }
}
