use axum::extract::{Query, Request, State};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::{Duration, Utc};
use log::{error, info, warn};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, SqlErr,
};
use serde::Deserialize;
use uuid::Uuid;

use entities::prelude::{Session, User};
use entities::session;
use entities::user::{self, Presence};
use entities::user_local_model::UserModel;

use crate::auth_middleware::{bearer_token, resolve_session};
use crate::handlers::{extract_json, unknown_action, ActionQuery};
use crate::responses::responses::{
    failure_response, message_response, ok_response, server_error_response, unauthorized_response,
};
use crate::responses::user_response::{
    LoginPayload, RegisteredPayload, SessionStatePayload, UserPayload,
};
use crate::sanitize;
use crate::AppState;

const SESSION_DAYS: i64 = 30;

/// One message for unknown identifier and wrong password alike, so the
/// endpoint cannot be used to enumerate usernames.
const BAD_CREDENTIALS: &str = "Invalid credentials";

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub usuario: String,
    pub nombre: String,
    pub clave: String,
    pub correo: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub usuario: String,
    pub clave: String,
}

pub async fn auth_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ActionQuery>,
) -> Response {
    match query.action.as_deref() {
        Some("check-session") => check_session(&state, &headers).await,
        other => unknown_action("auth", other),
    }
}

pub async fn auth_post(
    State(state): State<AppState>,
    Query(query): Query<ActionQuery>,
    request: Request,
) -> Response {
    match query.action.as_deref() {
        Some("register") => {
            let body = match extract_json::<RegisterRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            register(&state, body).await
        }
        Some("login") => {
            let body = match extract_json::<LoginRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            login(&state, body).await
        }
        Some("logout") => {
            let token = bearer_token(request.headers()).map(str::to_owned);
            logout(&state, token).await
        }
        other => unknown_action("auth", other),
    }
}

async fn register(state: &AppState, body: RegisterRequest) -> Response {
    let username = sanitize::sanitize_text(&body.usuario);
    let name = sanitize::sanitize_text(&body.nombre);
    let email = body.correo.trim().to_lowercase();

    if username.is_empty() || name.is_empty() || body.clave.is_empty() || email.is_empty() {
        return failure_response("All fields are required");
    }
    if let Err(message) = sanitize::validate_username(&username) {
        return failure_response(message);
    }
    if !sanitize::is_valid_email(&email) {
        return failure_response("Email address is not valid");
    }
    if let Err(message) = sanitize::validate_password(&body.clave) {
        return failure_response(message);
    }

    // Pre-checks pick the precise message; the unique constraints stay the
    // real guard against a concurrent duplicate.
    let duplicate_username = User::find()
        .filter(user::Column::Username.eq(&username))
        .one(&state.connection)
        .await;
    match duplicate_username {
        Ok(Some(_)) => return failure_response("Username is already taken"),
        Ok(None) => {}
        Err(err) => {
            error!("duplicate username check failed: {}", err);
            return server_error_response();
        }
    }
    let duplicate_email = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.connection)
        .await;
    match duplicate_email {
        Ok(Some(_)) => return failure_response("Email is already registered"),
        Ok(None) => {}
        Err(err) => {
            error!("duplicate email check failed: {}", err);
            return server_error_response();
        }
    }

    let password_hash = match bcrypt::hash(&body.clave, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(err) => {
            error!("password hashing failed: {}", err);
            return server_error_response();
        }
    };

    let now = Utc::now().naive_utc();
    let new_user = UserModel {
        username: username.to_owned(),
        name,
        password_hash,
        email,
        created_at: now,
        last_access_at: now,
    };

    match User::insert(new_user.into_active_model())
        .exec(&state.connection)
        .await
    {
        Ok(inserted) => {
            info!("registered user {} ({})", username, inserted.last_insert_id);
            ok_response(RegisteredPayload {
                user_id: inserted.last_insert_id,
                usuario: username,
            })
        }
        Err(err) => {
            if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
                return failure_response("Username or email is already in use");
            }
            error!("user insert failed: {}", err);
            server_error_response()
        }
    }
}

async fn login(state: &AppState, body: LoginRequest) -> Response {
    let identifier = body.usuario.trim();
    if identifier.is_empty() || body.clave.is_empty() {
        return failure_response("Username and password are required");
    }

    // The identifier matches username or email.
    let lookup = User::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(identifier))
                .add(user::Column::Email.eq(identifier.to_lowercase())),
        )
        .one(&state.connection)
        .await;

    let user_row = match lookup {
        Ok(Some(user_row)) => user_row,
        Ok(None) => return failure_response(BAD_CREDENTIALS),
        Err(err) => {
            error!("login lookup failed: {}", err);
            return server_error_response();
        }
    };

    if !bcrypt::verify(&body.clave, &user_row.password_hash).unwrap_or(false) {
        warn!("wrong password for {}", user_row.username);
        return failure_response(BAD_CREDENTIALS);
    }

    let now = Utc::now();
    let mut online = user_row.clone().into_active_model();
    online.presence = ActiveValue::Set(Presence::Online);
    online.last_access_at = ActiveValue::Set(now.naive_utc());
    if let Err(err) = online.update(&state.connection).await {
        error!("could not update presence for {}: {}", user_row.id, err);
        return server_error_response();
    }

    let token = Uuid::new_v4().to_string();
    let new_session = session::ActiveModel {
        user_id: ActiveValue::Set(user_row.id),
        token: ActiveValue::Set(token.to_owned()),
        created_at: ActiveValue::Set(now.naive_utc()),
        expires_at: ActiveValue::Set((now + Duration::days(SESSION_DAYS)).naive_utc()),
        ..Default::default()
    };
    if let Err(err) = Session::insert(new_session).exec(&state.connection).await {
        error!("could not create session for {}: {}", user_row.id, err);
        return server_error_response();
    }

    info!("user {} logged in", user_row.username);
    ok_response(LoginPayload::new(&user_row, token))
}

async fn check_session(state: &AppState, headers: &HeaderMap) -> Response {
    let resolved = match bearer_token(headers) {
        Some(token) => resolve_session(state, token).await,
        None => None,
    };

    match resolved {
        Some((_, user_row)) => ok_response(SessionStatePayload {
            authenticated: true,
            user: Some(UserPayload::from(&user_row)),
        }),
        None => ok_response(SessionStatePayload {
            authenticated: false,
            user: None,
        }),
    }
}

async fn logout(state: &AppState, token: Option<String>) -> Response {
    let token = match token {
        Some(token) => token,
        None => return unauthorized_response("No active session"),
    };

    let (session_row, user_row) = match resolve_session(state, &token).await {
        Some(found) => found,
        None => return unauthorized_response("No active session"),
    };

    let mut offline = user_row.into_active_model();
    offline.presence = ActiveValue::Set(Presence::Offline);
    if let Err(err) = offline.update(&state.connection).await {
        error!("could not update presence on logout: {}", err);
        return server_error_response();
    }

    if let Err(err) = session_row.delete(&state.connection).await {
        error!("could not delete session: {}", err);
        return server_error_response();
    }

    message_response("Session closed")
}
