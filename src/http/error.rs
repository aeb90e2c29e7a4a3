//! Error responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::Error;

/// Map an extractor rejection, keeping body-limit rejections distinct.
pub(super) fn from_rejection(status: StatusCode, text: String) -> Error {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge
    } else {
        Error::BadRequest(text)
    }
}

/// JSON body of every failed request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub status_description: String,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            error!("Request failed: {}", self);
        }

        let challenge = self.is_authentication();
        let body = ErrorBody {
            status_code: status.as_u16(),
            status_description: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.public_message(),
        };
        let mut response = (status, Json(body)).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let response = Error::UserNotFound("ghost".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["statusDescription"], "Not Found");
        assert_eq!(body["message"], "User ghost not found");
    }

    #[tokio::test]
    async fn test_server_error_hides_detail() {
        let response = Error::inconsistent(Uuid::new_v4(), "secret path /var/data").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        let message = body["message"].as_str().unwrap();
        assert!(!message.contains("/var/data"));
    }

    #[test]
    fn test_token_errors_carry_challenge() {
        let response = Error::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let response = Error::Unauthorized("not owner".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[tokio::test]
    async fn test_length_limit_rejection_is_413() {
        let error = from_rejection(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
        let body = body_json(error.into_response()).await;
        assert_eq!(body["statusCode"], 413);
        assert_eq!(body["statusDescription"], "Payload Too Large");
        assert_eq!(body["message"], "Project file exceeds the upload size limit");

        let error = from_rejection(StatusCode::BAD_REQUEST, "malformed".into());
        assert!(matches!(error, Error::BadRequest(ref m) if m == "malformed"));
    }
}
