use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sqlx::SqlitePool;
use std::{any::Any, net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{auth, middleware::require_token, users};
use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::db;

pub const BANNER: &str = "RESTaurante API v1.0";

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: TokenKeys,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to open the database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("server i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the full router. Everything except `/`, `/register` and `/login`
/// sits behind the token gate, unknown paths included.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route(
            "/users/{id}",
            get(users::get_user)
                .delete(users::delete_user)
                .patch(users::update_password),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/", get(banner))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<(), ServerError> {
    let pool = db::connect(&config.database_url, config.database_max_connections).await?;
    tracing::info!(url = %config.database_url, "connected to database");

    let state = Arc::new(AppState {
        db: pool,
        tokens: TokenKeys::from_secret(config.secret.as_bytes()),
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "server running");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn banner() -> &'static str {
    BANNER
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "request handler panicked");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn boom() -> StatusCode {
        panic!("datastore exploded")
    }

    #[tokio::test]
    async fn test_panics_become_bare_500() {
        let app: Router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
