use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use crate::api::error::ApiError;
use crate::api::server::AppState;
use crate::api::validation::{self, string_field};
use crate::auth::{password, token::Claims};
use crate::db::{models::User, repo};

/// Public view of a user; the password hash has no field here.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub id: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            id: user.id,
        }
    }
}

/// A token only ever grants access to its own account.
fn ensure_owner(claims: &Claims, id: &str) -> Result<(), ApiError> {
    if claims.id != id {
        tracing::warn!(token_user = %claims.id, requested = %id, "cross-account access denied");
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    ensure_owner(&claims, &id)?;

    let user = repo::find_user_by_id(&state.db, &id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ensure_owner(&claims, &id)?;

    // Reports success whether or not a row existed.
    if repo::delete_user(&state.db, &id).await? {
        tracing::info!(user_id = %id, "deleted user");
    }

    Ok(StatusCode::OK)
}

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let payload = validation::parse_object(&body)?;
    validation::validate_user_body(&payload)?;
    ensure_owner(&claims, &id)?;

    let plain_password = string_field(&payload, "password")
        .ok_or(ApiError::MissingPassword)?
        .to_owned();
    let password_hash =
        spawn_blocking(move || password::hash_password(&plain_password)).await??;

    if repo::update_password_hash(&state.db, &id, &password_hash).await? {
        tracing::info!(user_id = %id, "updated password");
    }

    Ok(StatusCode::OK)
}
