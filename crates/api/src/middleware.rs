//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use backtalk_core::{CommentService, ModerationService, NotificationService, SessionService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub comment_service: CommentService,
    pub moderation_service: ModerationService,
    pub notification_service: NotificationService,
    pub session_service: SessionService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` session token to the actor's profile (creating it
/// lazily on first sight) and stores the profile in request extensions.
/// Requests without a valid token pass through anonymously; each handler
/// decides whether authentication is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(profile) = state.session_service.resolve(token).await
    {
        req.extensions_mut().insert(profile);
    }

    next.run(req).await
}
