//! Comment lifecycle engine.
//!
//! Orchestrates comment creation, status transitions, edits, deletion,
//! and listing. Every mutation consults the authorization policy before
//! any write; the status state machine has no structurally forbidden
//! transition, only the `ChangeStatus` gate.

use std::collections::HashMap;

use backtalk_common::{AppError, AppResult, IdGenerator};
use backtalk_db::{
    entities::{
        comment::{self, CommentStatus},
        profile,
    },
    repositories::{CommentRepository, CommentVisibility, ProfileRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::mentions::extract_mentions;
use crate::services::authz::{self, Action};

/// Longest accepted comment, in characters.
const MAX_CONTENT_LEN: usize = 10_000;

/// Input for submitting a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitCommentInput {
    /// Post the comment belongs to.
    #[validate(length(min = 1, max = 128))]
    pub post_id: String,

    pub content: String,

    /// Parent comment for replies.
    pub parent_id: Option<String>,
}

/// Trim and validate comment text.
fn validate_content(content: &str) -> AppResult<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation(
            "Comment content cannot be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(AppError::Validation("Comment content too long".to_string()));
    }
    Ok(content)
}

/// Query for listing a post's comments.
#[derive(Debug, Clone, Deserialize)]
pub struct ListCommentsQuery {
    /// Post to list comments for.
    pub post_id: String,
    /// 1-based page number.
    pub page: u64,
    /// Comments per page.
    pub page_size: u64,
    /// Moderators may request pending and rejected comments too.
    pub include_pending: bool,
}

/// A top-level comment with its replies.
///
/// Replies are flattened to their top-level ancestor and sorted oldest
/// first; storage keeps the original `parent_id`.
#[derive(Debug, Clone)]
pub struct CommentThread {
    /// The top-level comment.
    pub comment: comment::Model,
    /// All direct and indirect replies, ascending by creation time.
    pub replies: Vec<comment::Model>,
}

/// One page of a post's comments.
#[derive(Debug, Clone)]
pub struct CommentListing {
    /// Threads in page order (newest top-level comment first).
    pub threads: Vec<CommentThread>,
    /// Author profiles for every comment on the page, keyed by id.
    pub authors: HashMap<String, profile::Model>,
    /// Total matching comments, for pagination math.
    pub total: u64,
}

/// A moderation-queue entry: a comment plus its author, if still present.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    /// The queued comment (pending or rejected).
    pub comment: comment::Model,
    /// Author profile.
    pub author: Option<profile::Model>,
}

/// Initial status for a new submission.
///
/// Moderators and trusted users skip the pending queue; the flag is read
/// at submission time only, so trusting a user later does not reclassify
/// their existing comments.
#[must_use]
pub fn initial_status(actor: &profile::Model) -> CommentStatus {
    if actor.is_moderator || actor.is_trusted {
        CommentStatus::Approved
    } else {
        CommentStatus::Pending
    }
}

/// Store-level visibility filter for a viewer.
///
/// `include_pending` widens the filter to every status, but only for
/// moderators; for everyone else the flag is ignored.
#[must_use]
pub fn visibility_for(
    viewer: Option<&profile::Model>,
    include_pending: bool,
) -> CommentVisibility {
    match viewer {
        Some(v) if include_pending && v.is_moderator => CommentVisibility::All,
        Some(v) => CommentVisibility::ApprovedOrOwnPending {
            viewer_id: v.id.clone(),
        },
        None => CommentVisibility::Approved,
    }
}

/// Group one loaded page of comments into threads.
///
/// Each comment is attached to its top-level ancestor, found by walking
/// the `parent_id` chain iteratively through the in-memory page map. A
/// reply whose ancestors fall outside the loaded page anchors at the
/// furthest ancestor that is present, so the walk is bounded by the page
/// size.
#[must_use]
pub fn group_into_threads(comments: Vec<comment::Model>) -> Vec<CommentThread> {
    let by_id: HashMap<String, comment::Model> =
        comments.iter().map(|c| (c.id.clone(), c.clone())).collect();

    let root_of = |c: &comment::Model| -> String {
        let mut current = c;
        let mut hops = 0;
        while let Some(parent_id) = &current.parent_id {
            match by_id.get(parent_id) {
                Some(parent) if hops < by_id.len() => {
                    current = parent;
                    hops += 1;
                }
                _ => break,
            }
        }
        current.id.clone()
    };

    let mut threads: Vec<CommentThread> = Vec::new();
    let mut index_of_root: HashMap<String, usize> = HashMap::new();

    // First pass: top-level comments keep their page order
    for c in &comments {
        if root_of(c) == c.id {
            index_of_root.insert(c.id.clone(), threads.len());
            threads.push(CommentThread {
                comment: c.clone(),
                replies: Vec::new(),
            });
        }
    }

    // Second pass: attach replies to their resolved root
    for c in comments {
        let root = root_of(&c);
        if root != c.id
            && let Some(&idx) = index_of_root.get(&root)
        {
            threads[idx].replies.push(c);
        }
    }

    for thread in &mut threads {
        thread.replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }

    threads
}

/// Comment lifecycle service.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, profile_repo: ProfileRepository) -> Self {
        Self {
            comment_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new comment.
    pub async fn submit(
        &self,
        actor: &profile::Model,
        input: SubmitCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;
        let content = validate_content(&input.content)?;

        authz::authorize(
            Some(actor),
            &Action::CreateComment,
            chrono::Utc::now().date_naive(),
        )?;

        // Replies must land on an existing comment of the same post
        if let Some(parent_id) = &input.parent_id {
            let parent = self
                .comment_repo
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::CommentNotFound(parent_id.clone()))?;
            if parent.post_id != input.post_id {
                return Err(AppError::Validation(
                    "Parent comment belongs to a different post".to_string(),
                ));
            }
        }

        let mentions = extract_mentions(content);
        let status = initial_status(actor);

        let id = self.id_gen.generate();
        let model = comment::ActiveModel {
            id: Set(id),
            post_id: Set(input.post_id),
            user_id: Set(actor.id.clone()),
            parent_id: Set(input.parent_id),
            content: Set(content.to_string()),
            mentions: Set(serde_json::json!(mentions)),
            status: Set(status),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.comment_repo.create(model).await?;

        tracing::info!(
            actor_id = %actor.id,
            comment_id = %created.id,
            post_id = %created.post_id,
            status = created.status.as_str(),
            "Comment submitted"
        );

        Ok(created)
    }

    /// Move a comment to a new status.
    ///
    /// Moderators may move a comment between any of the three states at
    /// any time; there is no terminal status.
    pub async fn change_status(
        &self,
        actor: &profile::Model,
        comment_id: &str,
        new_status: CommentStatus,
    ) -> AppResult<comment::Model> {
        authz::authorize(
            Some(actor),
            &Action::ChangeStatus,
            chrono::Utc::now().date_naive(),
        )?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        let old_status = comment.status;

        let mut model: comment::ActiveModel = comment.into();
        model.status = Set(new_status);
        let updated = self.comment_repo.update(model).await?;

        tracing::info!(
            actor_id = %actor.id,
            comment_id = %comment_id,
            from = old_status.as_str(),
            to = new_status.as_str(),
            "Comment status changed"
        );

        Ok(updated)
    }

    /// Edit a comment's content. Owner only; status is untouched and
    /// mentions are recomputed from the new content.
    pub async fn edit(
        &self,
        actor: &profile::Model,
        comment_id: &str,
        new_content: &str,
    ) -> AppResult<comment::Model> {
        let content = validate_content(new_content)?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        authz::authorize(
            Some(actor),
            &Action::EditComment {
                author_id: comment.user_id.clone(),
            },
            chrono::Utc::now().date_naive(),
        )?;

        let mentions = extract_mentions(content);

        let mut model: comment::ActiveModel = comment.into();
        model.content = Set(content.to_string());
        model.mentions = Set(serde_json::json!(mentions));
        let updated = self.comment_repo.update(model).await?;

        tracing::info!(
            actor_id = %actor.id,
            comment_id = %comment_id,
            "Comment edited"
        );

        Ok(updated)
    }

    /// Delete a comment and every direct and indirect reply, so listings
    /// can never surface an orphaned reply.
    pub async fn delete(&self, actor: &profile::Model, comment_id: &str) -> AppResult<u64> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        authz::authorize(
            Some(actor),
            &Action::DeleteComment {
                author_id: comment.user_id.clone(),
            },
            chrono::Utc::now().date_naive(),
        )?;

        // Resolve the reply subtree over the post's comments in memory
        let post_comments = self.comment_repo.find_all_for_post(&comment.post_id).await?;
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for c in &post_comments {
            if let Some(parent_id) = &c.parent_id {
                children
                    .entry(parent_id.as_str())
                    .or_default()
                    .push(c.id.as_str());
            }
        }

        let mut doomed: Vec<String> = Vec::new();
        let mut stack = vec![comment.id.as_str()];
        while let Some(id) = stack.pop() {
            doomed.push(id.to_string());
            if let Some(kids) = children.get(id) {
                stack.extend(kids.iter().copied());
            }
        }

        let deleted = self.comment_repo.delete_by_ids(&doomed).await?;

        tracing::info!(
            actor_id = %actor.id,
            comment_id = %comment_id,
            post_id = %comment.post_id,
            deleted_rows = deleted,
            "Comment deleted"
        );

        Ok(deleted)
    }

    /// List one page of a post's comments, grouped into threads.
    ///
    /// Visibility: everyone sees approved comments; authenticated viewers
    /// also see their own pending ones; moderators asking for
    /// `include_pending` see everything, rejected included. The flag is
    /// ignored for everyone else.
    pub async fn list(
        &self,
        viewer: Option<&profile::Model>,
        query: &ListCommentsQuery,
    ) -> AppResult<CommentListing> {
        let page = query.page.max(1);
        let page_size = query.page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;

        let visibility = visibility_for(viewer, query.include_pending);

        let rows = self
            .comment_repo
            .find_page_for_post(&query.post_id, &visibility, page_size, offset)
            .await?;
        let total = self
            .comment_repo
            .count_for_post(&query.post_id, &visibility)
            .await?;

        let mut author_ids: Vec<String> = rows.iter().map(|c| c.user_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = self
            .profile_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        Ok(CommentListing {
            threads: group_into_threads(rows),
            authors,
            total,
        })
    }

    /// Comments awaiting moderator review (pending and rejected), newest
    /// first, with their authors attached.
    pub async fn moderation_queue(
        &self,
        actor: &profile::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<QueueEntry>> {
        authz::require_moderator(Some(actor))?;

        let comments = self.comment_repo.find_moderation_queue(limit, offset).await?;

        let author_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        let authors = self.profile_repo.find_by_ids(&author_ids).await?;
        let authors_by_id: HashMap<String, profile::Model> =
            authors.into_iter().map(|p| (p.id.clone(), p)).collect();

        Ok(comments
            .into_iter()
            .map(|c| {
                let author = authors_by_id.get(&c.user_id).cloned();
                QueueEntry { comment: c, author }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn profile(id: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            username: Some(id.to_string()),
            avatar_url: None,
            is_moderator: false,
            is_trusted: false,
            is_banned: false,
            suspended_until: None,
            created_at: Utc::now().into(),
        }
    }

    fn comment_at(
        id: &str,
        parent_id: Option<&str>,
        minutes_ago: i64,
    ) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: "p1".to_string(),
            user_id: "u1".to_string(),
            parent_id: parent_id.map(ToString::to_string),
            content: format!("comment {id}"),
            mentions: serde_json::json!([]),
            status: CommentStatus::Approved,
            created_at: (Utc::now() - Duration::minutes(minutes_ago)).into(),
        }
    }

    #[test]
    fn test_initial_status_pending_for_regular_users() {
        assert_eq!(initial_status(&profile("u1")), CommentStatus::Pending);
    }

    #[test]
    fn test_initial_status_approved_for_trusted_and_moderators() {
        let mut trusted = profile("u1");
        trusted.is_trusted = true;
        assert_eq!(initial_status(&trusted), CommentStatus::Approved);

        let mut moderator = profile("m1");
        moderator.is_moderator = true;
        assert_eq!(initial_status(&moderator), CommentStatus::Approved);
    }

    #[test]
    fn test_grouping_attaches_replies_to_top_level_ancestor() {
        // y is the root; x replies to y; c replies to x. Page order is
        // newest first, so c comes before x comes before y.
        let rows = vec![
            comment_at("c", Some("x"), 1),
            comment_at("x", Some("y"), 10),
            comment_at("y", None, 60),
        ];

        let threads = group_into_threads(rows);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.id, "y");
        // Replies flattened under the root and sorted ascending
        let reply_ids: Vec<&str> =
            threads[0].replies.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(reply_ids, vec!["x", "c"]);
    }

    #[test]
    fn test_grouping_keeps_top_level_page_order() {
        let rows = vec![
            comment_at("b", None, 5),
            comment_at("a", None, 30),
        ];
        let threads = group_into_threads(rows);
        let root_ids: Vec<&str> = threads.iter().map(|t| t.comment.id.as_str()).collect();
        assert_eq!(root_ids, vec!["b", "a"]);
    }

    #[test]
    fn test_reply_with_unloaded_ancestor_anchors_at_itself() {
        // Parent "gone" is not part of the loaded page
        let rows = vec![comment_at("orphanish", Some("gone"), 2)];
        let threads = group_into_threads(rows);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.id, "orphanish");
        assert!(threads[0].replies.is_empty());
    }

    #[test]
    fn test_grouping_empty_page() {
        assert!(group_into_threads(vec![]).is_empty());
    }

    #[test]
    fn test_anonymous_viewers_see_approved_only() {
        assert!(matches!(
            visibility_for(None, false),
            CommentVisibility::Approved
        ));
        // The flag means nothing without a moderator session
        assert!(matches!(
            visibility_for(None, true),
            CommentVisibility::Approved
        ));
    }

    #[test]
    fn test_viewers_see_their_own_pending_comments() {
        let viewer = profile("u1");
        match visibility_for(Some(&viewer), false) {
            CommentVisibility::ApprovedOrOwnPending { viewer_id } => {
                assert_eq!(viewer_id, "u1");
            }
            other => panic!("unexpected visibility: {other:?}"),
        }
    }

    #[test]
    fn test_include_pending_is_ignored_for_non_moderators() {
        let viewer = profile("u1");
        assert!(matches!(
            visibility_for(Some(&viewer), true),
            CommentVisibility::ApprovedOrOwnPending { .. }
        ));
    }

    #[test]
    fn test_moderators_with_include_pending_see_everything() {
        let mut moderator = profile("m1");
        moderator.is_moderator = true;
        assert!(matches!(
            visibility_for(Some(&moderator), true),
            CommentVisibility::All
        ));
        // Without the flag a moderator browses like a normal viewer
        assert!(matches!(
            visibility_for(Some(&moderator), false),
            CommentVisibility::ApprovedOrOwnPending { .. }
        ));
    }
}
