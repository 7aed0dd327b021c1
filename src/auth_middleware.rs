use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use log::{error, warn};
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter};

use entities::prelude::{Session, User};
use entities::{session, user};

use crate::responses::responses::unauthorized_response;
use crate::AppState;

/// The acting principal for one request, resolved from the session token by
/// the middleware and handed to handlers through request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub name: String,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve a bearer token to its session and user. Expired sessions are
/// deleted on sight and reported as absent.
pub async fn resolve_session(
    state: &AppState,
    token: &str,
) -> Option<(session::Model, user::Model)> {
    let session_row = match Session::find()
        .filter(session::Column::Token.eq(token))
        .one(&state.connection)
        .await
    {
        Ok(row) => row?,
        Err(err) => {
            error!("session lookup failed: {}", err);
            return None;
        }
    };

    if session_row.expires_at < Utc::now().naive_utc() {
        warn!("expired session for user {}", session_row.user_id);
        if let Err(err) = session_row.delete(&state.connection).await {
            error!("could not delete expired session: {}", err);
        }
        return None;
    }

    let user_row = match User::find_by_id(session_row.user_id)
        .one(&state.connection)
        .await
    {
        Ok(row) => row?,
        Err(err) => {
            error!("session user lookup failed: {}", err);
            return None;
        }
    };

    Some((session_row, user_row))
}

pub async fn session_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Some(token) => token.to_owned(),
        None => return unauthorized_response("No active session"),
    };

    match resolve_session(&state, &token).await {
        Some((_, user_row)) => {
            request.extensions_mut().insert(CurrentUser {
                id: user_row.id,
                username: user_row.username,
                name: user_row.name,
            });
            next.run(request).await
        }
        None => unauthorized_response("No active session"),
    }
}
