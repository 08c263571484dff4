use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::server::AppState;

/// Authentication gate for every route mounted after `/login`.
///
/// On success the decoded [`Claims`](crate::auth::token::Claims) are stored in
/// the request extensions for the handlers downstream.
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_headers(request.headers())?;
    let claims = state.tokens.verify(token).map_err(|error| {
        tracing::debug!(%error, "rejected token");
        ApiError::InvalidToken
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Accepts both `Authorization: Bearer <token>` and a bare token.
fn token_from_headers(headers: &HeaderMap) -> Result<&str, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(ApiError::MissingToken);
    };
    let value = value.to_str().map_err(|_| ApiError::InvalidToken)?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    };

    if token.is_empty() {
        return Err(ApiError::MissingToken);
    }
    Ok(token)
}
