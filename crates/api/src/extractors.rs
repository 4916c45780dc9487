//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use backtalk_db::entities::profile;

/// Authenticated actor extractor.
///
/// The auth middleware resolves the bearer token to a profile and stores
/// it in request extensions; handlers that require authentication take
/// this extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub profile::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<profile::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Optional actor extractor, for endpoints anonymous viewers may hit.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<profile::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<profile::Model>().cloned()))
    }
}
