pub mod auth_handlers;
pub mod friend_handlers;
pub mod like_handlers;
pub mod music_handlers;
pub mod post_handlers;
pub mod user_handlers;

use axum::extract::Request;
use axum::response::Response;
use axum::{Json, RequestExt};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::responses::responses::failure_response;

/// Every endpoint area is a front controller keyed by `?action=`.
#[derive(Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

pub(crate) fn unknown_action(area: &str, action: Option<&str>) -> Response {
    warn!(
        "unknown {} action '{}'",
        area,
        action.unwrap_or("<missing>")
    );
    failure_response(&format!("Unknown {} action", area))
}

/// Pull a JSON body out of the raw request. The body shape depends on the
/// action, so the dispatch handlers extract it per branch.
pub(crate) async fn extract_json<T>(request: Request) -> Result<T, Response>
where
    T: DeserializeOwned + 'static,
{
    match request.extract::<Json<T>, _>().await {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!("invalid request body: {}", rejection);
            Err(failure_response("Invalid request body"))
        }
    }
}
