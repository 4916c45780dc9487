//! Authentication endpoints.
//!
//! Credentials live in the external identity store; the only surface
//! here is the current actor's profile, which the auth middleware will
//! have created lazily on the first authenticated request.

use axum::{routing::get, Json, Router};
use backtalk_common::AppResult;
use backtalk_db::entities::profile;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState};

/// The current actor's profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub is_moderator: bool,
    pub is_trusted: bool,
    pub is_banned: bool,
    pub suspended_until: Option<String>,
    pub created_at: String,
}

impl From<profile::Model> for MeResponse {
    fn from(profile: profile::Model) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            avatar_url: profile.avatar_url,
            is_moderator: profile.is_moderator,
            is_trusted: profile.is_trusted,
            is_banned: profile.is_banned,
            suspended_until: profile.suspended_until.map(|d| d.to_string()),
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

/// Return the authenticated actor's profile.
async fn me(AuthUser(actor): AuthUser) -> AppResult<Json<MeResponse>> {
    Ok(Json(actor.into()))
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}
