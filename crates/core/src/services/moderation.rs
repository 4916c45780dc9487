//! User moderation engine.
//!
//! Trust, ban, and suspension transitions on profiles. Moderator accounts
//! are immutable targets; no transition excludes another (a user can be
//! trusted and suspended at the same time — trust only picks the initial
//! comment status, suspension only blocks submission).

use backtalk_common::{AppError, AppResult};
use backtalk_db::{entities::profile, repositories::ProfileRepository};
use chrono::NaiveDate;
use sea_orm::Set;
use serde::Deserialize;

use crate::services::authz::{self, Action};

// Maps a present-but-null JSON field to Some(None), so an explicit null
// is distinguishable from an absent field.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Partial update applied to a profile's moderation state.
///
/// `suspended_until` distinguishes "not provided" from an explicit null
/// (which lifts the suspension).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserStatusInput {
    pub is_trusted: Option<bool>,
    pub is_banned: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub suspended_until: Option<Option<NaiveDate>>,
}

impl UpdateUserStatusInput {
    /// Whether the update carries any field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.is_trusted.is_none() && self.is_banned.is_none() && self.suspended_until.is_none()
    }
}

/// User moderation service.
#[derive(Clone)]
pub struct ModerationService {
    profile_repo: ProfileRepository,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self { profile_repo }
    }

    /// Authorize `actor` against `target_id` and load the target.
    async fn guarded_target(
        &self,
        actor: &profile::Model,
        target_id: &str,
    ) -> AppResult<profile::Model> {
        authz::require_moderator(Some(actor))?;

        let target = self.profile_repo.get_by_id(target_id).await?;
        authz::authorize(
            Some(actor),
            &Action::ModerateUser {
                target_is_moderator: target.is_moderator,
            },
            chrono::Utc::now().date_naive(),
        )?;

        Ok(target)
    }

    async fn apply_update(
        &self,
        actor: &profile::Model,
        target: profile::Model,
        input: &UpdateUserStatusInput,
        action: &str,
    ) -> AppResult<profile::Model> {
        let target_id = target.id.clone();
        let mut model: profile::ActiveModel = target.into();

        if let Some(trusted) = input.is_trusted {
            model.is_trusted = Set(trusted);
        }
        if let Some(banned) = input.is_banned {
            model.is_banned = Set(banned);
        }
        if let Some(until) = input.suspended_until {
            model.suspended_until = Set(until);
        }

        let updated = self.profile_repo.update(model).await?;

        tracing::info!(
            actor_id = %actor.id,
            target_id = %target_id,
            action = action,
            "User moderation applied"
        );

        Ok(updated)
    }

    /// Mark a user trusted: future submissions skip the pending queue.
    ///
    /// Existing pending comments are not reclassified.
    pub async fn trust(&self, actor: &profile::Model, user_id: &str) -> AppResult<profile::Model> {
        let target = self.guarded_target(actor, user_id).await?;
        let input = UpdateUserStatusInput {
            is_trusted: Some(true),
            ..Default::default()
        };
        self.apply_update(actor, target, &input, "trust").await
    }

    /// Remove a user's trusted flag.
    pub async fn untrust(
        &self,
        actor: &profile::Model,
        user_id: &str,
    ) -> AppResult<profile::Model> {
        let target = self.guarded_target(actor, user_id).await?;
        let input = UpdateUserStatusInput {
            is_trusted: Some(false),
            ..Default::default()
        };
        self.apply_update(actor, target, &input, "untrust").await
    }

    /// Ban a user from submitting comments.
    pub async fn ban(&self, actor: &profile::Model, user_id: &str) -> AppResult<profile::Model> {
        let target = self.guarded_target(actor, user_id).await?;
        let input = UpdateUserStatusInput {
            is_banned: Some(true),
            ..Default::default()
        };
        self.apply_update(actor, target, &input, "ban").await
    }

    /// Lift a user's ban.
    pub async fn unban(&self, actor: &profile::Model, user_id: &str) -> AppResult<profile::Model> {
        let target = self.guarded_target(actor, user_id).await?;
        let input = UpdateUserStatusInput {
            is_banned: Some(false),
            ..Default::default()
        };
        self.apply_update(actor, target, &input, "unban").await
    }

    /// Suspend a user until the given calendar date.
    ///
    /// The date must not be before the current date.
    pub async fn suspend(
        &self,
        actor: &profile::Model,
        user_id: &str,
        until: NaiveDate,
    ) -> AppResult<profile::Model> {
        validate_suspension_date(until, chrono::Utc::now().date_naive())?;

        let target = self.guarded_target(actor, user_id).await?;
        let input = UpdateUserStatusInput {
            suspended_until: Some(Some(until)),
            ..Default::default()
        };
        self.apply_update(actor, target, &input, "suspend").await
    }

    /// Clear a user's suspension.
    pub async fn unsuspend(
        &self,
        actor: &profile::Model,
        user_id: &str,
    ) -> AppResult<profile::Model> {
        let target = self.guarded_target(actor, user_id).await?;
        let input = UpdateUserStatusInput {
            suspended_until: Some(None),
            ..Default::default()
        };
        self.apply_update(actor, target, &input, "unsuspend").await
    }

    /// Apply any subset of trust/ban/suspension fields in one row update.
    pub async fn apply(
        &self,
        actor: &profile::Model,
        user_id: &str,
        input: UpdateUserStatusInput,
    ) -> AppResult<profile::Model> {
        if input.is_empty() {
            return Err(AppError::Validation(
                "At least one field must be provided for update".to_string(),
            ));
        }
        if let Some(Some(until)) = input.suspended_until {
            validate_suspension_date(until, chrono::Utc::now().date_naive())?;
        }

        let target = self.guarded_target(actor, user_id).await?;
        self.apply_update(actor, target, &input, "update").await
    }

    /// List profiles for the moderation dashboard, newest first.
    pub async fn list_users(
        &self,
        actor: &profile::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<profile::Model>, u64)> {
        authz::require_moderator(Some(actor))?;

        let users = self.profile_repo.list(limit, offset).await?;
        let total = self.profile_repo.count().await?;
        Ok((users, total))
    }
}

/// A suspension may not end before the day it is issued.
fn validate_suspension_date(until: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if until < today {
        return Err(AppError::Validation(
            "Suspension date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_detected() {
        assert!(UpdateUserStatusInput::default().is_empty());
        assert!(!UpdateUserStatusInput {
            is_trusted: Some(true),
            ..Default::default()
        }
        .is_empty());
        // Explicit null still counts as a provided field
        assert!(!UpdateUserStatusInput {
            suspended_until: Some(None),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_suspension_date_not_before_today() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        let past = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        assert!(validate_suspension_date(past, today).is_err());

        // Same-day suspension is allowed (and immediately inactive)
        assert!(validate_suspension_date(today, today).is_ok());

        let future = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert!(validate_suspension_date(future, today).is_ok());
    }
}
