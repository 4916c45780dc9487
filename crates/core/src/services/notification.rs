//! Moderation count projection.
//!
//! A read-only view over the comment store for the moderator dashboard.
//! Clients poll it (the reference UI every 30 seconds); staleness up to
//! the polling interval is by design and there is no push channel.

use backtalk_common::AppResult;
use backtalk_db::{
    entities::{comment::CommentStatus, profile},
    repositories::CommentRepository,
};

use crate::services::authz;

/// Pending moderation work, as shown in the moderator UI badge.
#[derive(Debug, Clone, Copy)]
pub struct PendingCount {
    /// Comments currently awaiting review.
    pub pending_count: u64,
    /// Convenience flag for badge rendering.
    pub has_pending_items: bool,
}

/// Moderation count service.
#[derive(Clone)]
pub struct NotificationService {
    comment_repo: CommentRepository,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository) -> Self {
        Self { comment_repo }
    }

    /// Count comments awaiting moderation across all posts.
    pub async fn pending_count(&self, actor: &profile::Model) -> AppResult<PendingCount> {
        authz::require_moderator(Some(actor))?;

        let pending_count = self
            .comment_repo
            .count_by_status(CommentStatus::Pending)
            .await?;

        Ok(PendingCount {
            pending_count,
            has_pending_items: pending_count > 0,
        })
    }
}
