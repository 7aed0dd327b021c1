use axum::extract::{Extension, Query, Request, State};
use axum::response::Response;
use log::error;
use sea_orm::EntityTrait;
use serde::Deserialize;

use entities::prelude::Post;

use crate::auth_middleware::CurrentUser;
use crate::handlers::{extract_json, unknown_action, ActionQuery};
use crate::responses::post_response::LikeTogglePayload;
use crate::responses::responses::{failure_response, ok_response, server_error_response};
use crate::AppState;

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub publicacion_id: i32,
}

/// Same toggle as posts/like, kept as its own endpoint area because the
/// original clients call it with `publicacion_id` and expect a boolean.
pub async fn likes_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ActionQuery>,
    request: Request,
) -> Response {
    match query.action.as_deref() {
        Some("toggle") => {
            let body = match extract_json::<ToggleRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            toggle(&state, &current, body.publicacion_id).await
        }
        other => unknown_action("likes", other),
    }
}

async fn toggle(state: &AppState, current: &CurrentUser, post_id: i32) -> Response {
    match Post::find_by_id(post_id).one(&state.connection).await {
        Ok(Some(_)) => {}
        Ok(None) => return failure_response("Post not found"),
        Err(err) => {
            error!("post lookup failed: {}", err);
            return server_error_response();
        }
    }

    match queries::toggle_post_like(&state.pool, post_id, current.id).await {
        Ok((liked, total_likes)) => ok_response(LikeTogglePayload { liked, total_likes }),
        Err(err) => {
            error!("like toggle failed: {}", err);
            server_error_response()
        }
    }
}
