//! Authorization policy.
//!
//! Pure decision logic: given an actor's profile and an action, allow or
//! deny. No side effects; every caller checks the policy before touching
//! the store, on the same profile row the mutation will use.

use backtalk_common::{AppError, AppResult};
use backtalk_db::entities::profile;
use chrono::NaiveDate;

/// An action subject to authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Submit a new comment.
    CreateComment,
    /// Move a comment between pending/approved/rejected.
    ChangeStatus,
    /// Edit a comment's content.
    EditComment {
        /// Author of the target comment.
        author_id: String,
    },
    /// Delete a comment.
    DeleteComment {
        /// Author of the target comment.
        author_id: String,
    },
    /// Mutate another user's trust/ban/suspension state.
    ModerateUser {
        /// Whether the target profile is itself a moderator.
        target_is_moderator: bool,
    },
}

/// Whether a suspension is active on `today`.
///
/// `suspended_until` is a calendar date; the suspension covers every day
/// strictly before it.
#[must_use]
pub fn suspension_active(profile: &profile::Model, today: NaiveDate) -> bool {
    profile.suspended_until.is_some_and(|until| until > today)
}

/// Require an authenticated moderator.
pub fn require_moderator(actor: Option<&profile::Model>) -> AppResult<()> {
    let actor = actor.ok_or(AppError::Unauthorized)?;
    if !actor.is_moderator {
        return Err(AppError::Forbidden("Moderator access required".to_string()));
    }
    Ok(())
}

/// Decide whether `actor` may perform `action`.
///
/// `today` is passed in rather than read from the clock so the policy
/// stays a pure function.
pub fn authorize(
    actor: Option<&profile::Model>,
    action: &Action,
    today: NaiveDate,
) -> AppResult<()> {
    let actor = actor.ok_or(AppError::Unauthorized)?;

    match action {
        Action::CreateComment => {
            if actor.is_banned {
                return Err(AppError::Forbidden(
                    "Banned users cannot post comments".to_string(),
                ));
            }
            if suspension_active(actor, today) {
                return Err(AppError::Forbidden(
                    "Account is suspended from commenting".to_string(),
                ));
            }
            Ok(())
        }
        Action::ChangeStatus => {
            if !actor.is_moderator {
                return Err(AppError::Forbidden(
                    "Only moderators can update comment status".to_string(),
                ));
            }
            Ok(())
        }
        Action::EditComment { author_id } => {
            // Owner only; moderators may not edit others' content
            if actor.id != *author_id {
                return Err(AppError::Forbidden(
                    "Only the comment owner can edit this comment".to_string(),
                ));
            }
            Ok(())
        }
        Action::DeleteComment { author_id } => {
            if actor.id != *author_id && !actor.is_moderator {
                return Err(AppError::Forbidden(
                    "Only the comment owner or moderators can delete this comment".to_string(),
                ));
            }
            Ok(())
        }
        Action::ModerateUser {
            target_is_moderator,
        } => {
            if !actor.is_moderator {
                return Err(AppError::Forbidden("Moderator access required".to_string()));
            }
            if *target_is_moderator {
                return Err(AppError::Forbidden(
                    "Cannot modify moderator accounts".to_string(),
                ));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(id: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            username: Some(id.to_string()),
            avatar_url: None,
            is_moderator: false,
            is_trusted: false,
            is_banned: false,
            suspended_until: None,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_anonymous_actor_is_unauthorized() {
        let err = authorize(None, &Action::CreateComment, today()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_regular_user_can_create_comment() {
        let user = profile("u1");
        assert!(authorize(Some(&user), &Action::CreateComment, today()).is_ok());
    }

    #[test]
    fn test_banned_user_cannot_create_comment() {
        let mut user = profile("u1");
        user.is_banned = true;
        let err = authorize(Some(&user), &Action::CreateComment, today()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_suspension_blocks_creation_only_while_in_future() {
        let mut user = profile("u1");

        user.suspended_until = NaiveDate::from_ymd_opt(2025, 6, 20);
        assert!(authorize(Some(&user), &Action::CreateComment, today()).is_err());

        // Suspension ending today is no longer active
        user.suspended_until = Some(today());
        assert!(authorize(Some(&user), &Action::CreateComment, today()).is_ok());

        user.suspended_until = NaiveDate::from_ymd_opt(2025, 6, 1);
        assert!(authorize(Some(&user), &Action::CreateComment, today()).is_ok());
    }

    #[test]
    fn test_banned_user_is_blocked_even_if_trusted() {
        let mut user = profile("u1");
        user.is_trusted = true;
        user.is_banned = true;
        assert!(authorize(Some(&user), &Action::CreateComment, today()).is_err());
    }

    #[test]
    fn test_change_status_requires_moderator() {
        let user = profile("u1");
        let err = authorize(Some(&user), &Action::ChangeStatus, today()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut moderator = profile("m1");
        moderator.is_moderator = true;
        assert!(authorize(Some(&moderator), &Action::ChangeStatus, today()).is_ok());
    }

    #[test]
    fn test_edit_is_owner_only_even_for_moderators() {
        let mut moderator = profile("m1");
        moderator.is_moderator = true;
        let action = Action::EditComment {
            author_id: "u1".to_string(),
        };
        assert!(authorize(Some(&moderator), &action, today()).is_err());

        let owner = profile("u1");
        assert!(authorize(Some(&owner), &action, today()).is_ok());
    }

    #[test]
    fn test_delete_allows_owner_or_moderator() {
        let action = Action::DeleteComment {
            author_id: "u1".to_string(),
        };

        let owner = profile("u1");
        assert!(authorize(Some(&owner), &action, today()).is_ok());

        let mut moderator = profile("m1");
        moderator.is_moderator = true;
        assert!(authorize(Some(&moderator), &action, today()).is_ok());

        let other = profile("u2");
        assert!(authorize(Some(&other), &action, today()).is_err());
    }

    #[test]
    fn test_moderators_are_immune_targets() {
        let mut moderator = profile("m1");
        moderator.is_moderator = true;
        let err = authorize(
            Some(&moderator),
            &Action::ModerateUser {
                target_is_moderator: true,
            },
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_moderate_user_requires_moderator_actor() {
        let user = profile("u1");
        assert!(authorize(
            Some(&user),
            &Action::ModerateUser {
                target_is_moderator: false,
            },
            today(),
        )
        .is_err());
    }
}
