//! services/api/src/web/mod.rs
//!
//! HTTP surface of the service. `router` builds every API route over a shared
//! `AppState`; the binary adds CORS and the Swagger UI on top.

pub mod auth;
pub mod capture;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use middleware::require_user;
pub use rest::ApiDoc;
pub use state::AppState;

/// Uploads larger than this are rejected before they reach a handler.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no identity required)
    let public_routes = Router::new()
        .route("/health", get(rest::health_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler));

    // Notebook routes, scoped to whoever the identity provider reports
    let protected_routes = Router::new()
        .route(
            "/notebooks",
            get(rest::list_notebooks_handler).post(rest::create_notebook_handler),
        )
        .route(
            "/notebooks/{id}",
            get(rest::get_notebook_handler)
                .patch(rest::update_notebook_handler)
                .delete(rest::delete_notebook_handler),
        )
        .route("/notebooks/{id}/append", post(rest::append_text_handler))
        .route("/notebooks/{id}/capture", post(capture::capture_append_handler))
        .route("/captures", post(capture::capture_notebook_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_user,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
