use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use crate::api::error::ApiError;
use crate::api::server::AppState;
use crate::api::validation::{self, string_field};
use crate::auth::{password, token::Claims};
use crate::db::repo;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let payload = validation::parse_object(&body)?;
    validation::validate_user_body(&payload)?;

    let (Some(username), Some(email), Some(plain_password)) = (
        string_field(&payload, "username"),
        string_field(&payload, "email"),
        string_field(&payload, "password"),
    ) else {
        return Err(ApiError::MissingProperty);
    };

    let plain_password = plain_password.to_owned();
    let password_hash =
        spawn_blocking(move || password::hash_password(&plain_password)).await??;
    let user = repo::insert_user(&state.db, username, email, &password_hash)
        .await
        .inspect_err(|e| {
            if matches!(e, repo::InsertUserError::DuplicateEmail) {
                tracing::info!("registration rejected: email already in use");
            }
        })?;

    tracing::info!(user_id = %user.id, "registered user");
    Ok(StatusCode::OK)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AuthResponse>, ApiError> {
    let payload = validation::parse_object_lenient(&body);

    let Some(email) = string_field(&payload, "email") else {
        return Err(ApiError::LoginFailed);
    };
    let user = repo::find_user_by_email(&state.db, email).await?;
    let (Some(user), Some(plain_password)) = (user, string_field(&payload, "password")) else {
        return Err(ApiError::LoginFailed);
    };

    let attempt = plain_password.to_owned();
    let stored_hash = user.password_hash.clone();
    let matched =
        spawn_blocking(move || password::verify_password(&attempt, &stored_hash)).await??;
    if !matched {
        tracing::warn!(user_id = %user.id, "login rejected: wrong password");
        return Err(ApiError::WrongPassword);
    }

    let token = state.tokens.issue(&Claims::for_user(&user))?;
    tracing::info!(user_id = %user.id, "issued login token");

    Ok(Json(AuthResponse { token }))
}
