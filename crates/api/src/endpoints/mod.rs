//! API endpoints.

mod auth;
mod comments;
mod moderator;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/comments", comments::router())
        .nest("/moderator", moderator::router())
}
