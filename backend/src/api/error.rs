use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::repo::InsertUserError;

/// Every way a request can fail.
///
/// The `Display` text of client-facing variants is the exact body sent back;
/// internal variants are logged and answered with a bare 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("empty json")]
    EmptyBody,
    #[error("invalid json")]
    InvalidJson,
    #[error("{0}")]
    Schema(String),
    #[error("missing property")]
    MissingProperty,
    #[error("existing user")]
    ExistingUser,
    #[error("login error")]
    LoginFailed,
    #[error("wrong password")]
    WrongPassword,
    #[error("no token specified")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token does not grant access to this account")]
    Forbidden,
    #[error("user not found")]
    NotFound,
    #[error("no password specified")]
    MissingPassword,

    #[error("datastore failure: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failure: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("token encoding failure: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("blocking task failure: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl From<InsertUserError> for ApiError {
    fn from(err: InsertUserError) -> Self {
        match err {
            InsertUserError::DuplicateEmail => Self::ExistingUser,
            InsertUserError::Database(e) => Self::Database(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyBody
            | Self::InvalidJson
            | Self::Schema(_)
            | Self::MissingProperty
            | Self::ExistingUser
            | Self::LoginFailed
            | Self::MissingToken
            | Self::MissingPassword => StatusCode::BAD_REQUEST,
            Self::WrongPassword | Self::InvalidToken | Self::Forbidden => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::PasswordHash(_) | Self::Token(_) | Self::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::EmptyBody | Self::InvalidJson | Self::Schema(_) => {
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
            Self::Forbidden | Self::NotFound => status.into_response(),
            Self::Database(_) | Self::PasswordHash(_) | Self::Token(_) | Self::Blocking(_) => {
                tracing::error!(error = %self, "request failed");
                status.into_response()
            }
            _ => (status, self.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_schema_errors_are_json() {
        let (status, body) = render(ApiError::EmptyBody).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"empty json"}"#);
    }

    #[tokio::test]
    async fn test_client_errors_are_plain_text() {
        assert_eq!(
            render(ApiError::ExistingUser).await,
            (StatusCode::BAD_REQUEST, "existing user".to_string())
        );
        assert_eq!(
            render(ApiError::WrongPassword).await,
            (StatusCode::UNAUTHORIZED, "wrong password".to_string())
        );
        assert_eq!(
            render(ApiError::MissingToken).await,
            (StatusCode::BAD_REQUEST, "no token specified".to_string())
        );
    }

    #[tokio::test]
    async fn test_status_only_errors_have_no_body() {
        assert_eq!(
            render(ApiError::Forbidden).await,
            (StatusCode::UNAUTHORIZED, String::new())
        );
        assert_eq!(
            render(ApiError::NotFound).await,
            (StatusCode::NOT_FOUND, String::new())
        );
    }

    #[tokio::test]
    async fn test_internal_errors_hide_their_cause() {
        let (status, body) = render(ApiError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
    }

    #[test]
    fn test_duplicate_insert_maps_to_existing_user() {
        let err: ApiError = InsertUserError::DuplicateEmail.into();
        assert!(matches!(err, ApiError::ExistingUser));
    }
}
