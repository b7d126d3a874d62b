//! services/api/src/web/middleware.rs
//!
//! Identity middleware for the notebook routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// The owner id every notebook operation in this request is scoped to.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

/// Middleware that resolves the caller through the active identity provider.
///
/// If someone is signed in, inserts a `CurrentUser` into request extensions.
/// Otherwise returns 401 Unauthorized.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = state
        .identity
        .provider()
        .current_user_id()?
        .ok_or(ApiError::Unauthorized)?;

    debug!("{} {} as {}", req.method(), req.uri().path(), user_id);
    req.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(req).await)
}
