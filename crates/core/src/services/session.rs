//! Session resolution.
//!
//! The identity store is external: backtalk consumes its signed session
//! tokens and keeps exactly one profile row per identity. Profiles are
//! created lazily on the first authenticated request and never deleted
//! here. Banned and suspended users still resolve — only comment
//! submission is blocked, by the authorization policy.

use backtalk_common::{AppError, AppResult, Config};
use backtalk_db::{entities::profile, repositories::ProfileRepository};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use sea_orm::Set;
use serde::Deserialize;

/// Claims carried by the identity store's session tokens.
#[derive(Debug, Deserialize)]
struct SessionClaims {
    /// Identity id.
    sub: String,
    /// Email, used to derive a default username.
    email: Option<String>,
    #[allow(dead_code)]
    exp: usize,
}

/// Session service: token verification plus lazy profile creation.
#[derive(Clone)]
pub struct SessionService {
    profile_repo: ProfileRepository,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionService {
    /// Create a new session service from the auth configuration.
    #[must_use]
    pub fn new(profile_repo: ProfileRepository, config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.auth.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            profile_repo,
            decoding_key: DecodingKey::from_secret(config.auth.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Resolve a bearer token to the actor's profile.
    pub async fn resolve(&self, token: &str) -> AppResult<profile::Model> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AppError::Unauthorized)?;

        self.ensure_profile(&data.claims.sub, data.claims.email.as_deref())
            .await
    }

    /// Load a profile, creating it on first sight of this identity.
    ///
    /// The default username is the local part of the email address.
    pub async fn ensure_profile(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> AppResult<profile::Model> {
        if let Some(existing) = self.profile_repo.find_by_id(user_id).await? {
            return Ok(existing);
        }

        let username = email
            .and_then(|e| e.split('@').next())
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);

        let model = profile::ActiveModel {
            id: Set(user_id.to_string()),
            username: Set(username),
            avatar_url: Set(None),
            is_moderator: Set(false),
            is_trusted: Set(false),
            is_banned: Set(false),
            suspended_until: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.profile_repo.create(model).await?;
        tracing::info!(profile_id = %created.id, "Profile created on first session");
        Ok(created)
    }
}
