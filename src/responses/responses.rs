use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// The envelope every endpoint answers with:
/// `{success, message?, data?, count?}`.
#[derive(Serialize, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            count: None,
        }
    }

    pub fn ok_with_count(data: T, count: u64) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            count: Some(count),
        }
    }
}

impl ApiResponse<Value> {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            count: None,
        }
    }

    pub fn from_failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            count: None,
        }
    }
}

pub fn ok_response<T: Serialize>(data: T) -> Response {
    Json(ApiResponse::ok(data)).into_response()
}

pub fn ok_with_count<T: Serialize>(data: T, count: u64) -> Response {
    Json(ApiResponse::ok_with_count(data, count)).into_response()
}

pub fn message_response(message: &str) -> Response {
    Json(ApiResponse::from_message(message)).into_response()
}

/// Domain failure: validation, authorization, not-found. Always 400 with a
/// human-readable message, per the original contract.
pub fn failure_response(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::from_failure(message)),
    )
        .into_response()
}

pub fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::from_failure(message)),
    )
        .into_response()
}

/// Infrastructure failure. The message is fixed so driver errors never leak.
pub fn server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::from_failure("Internal server error")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_omits_message_and_count() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("message").is_none());
        assert!(json.get("count").is_none());
    }

    #[test]
    fn count_envelope_carries_count() {
        let json = serde_json::to_value(ApiResponse::ok_with_count(Vec::<i32>::new(), 0)).unwrap();
        assert_eq!(json["count"], 0);
    }

    #[test]
    fn failure_envelope_has_message_and_no_data() {
        let json = serde_json::to_value(ApiResponse::from_failure("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "nope");
        assert!(json.get("data").is_none());
    }
}
