//! Moderator endpoints.
//!
//! The pending-count route is polled by the moderator UI (the reference
//! client every 30 seconds); there is no push channel.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use backtalk_common::AppResult;
use backtalk_core::{QueueEntry, UpdateUserStatusInput};
use backtalk_db::entities::profile;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState};

/// Profile as shown in the moderation dashboard.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModeratorUserResponse {
    pub id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub is_moderator: bool,
    pub is_trusted: bool,
    pub is_banned: bool,
    /// Calendar date; the suspension is active while strictly in the future.
    pub suspended_until: Option<String>,
    pub created_at: String,
}

impl From<profile::Model> for ModeratorUserResponse {
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

/// Pending count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCountResponse {
    pub pending_count: u64,
    pub has_pending_items: bool,
}

/// Count of comments awaiting moderation.
async fn pending_count(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<PendingCountResponse>> {
    let count = state.notification_service.pending_count(&actor).await?;
    Ok(Json(PendingCountResponse {
        pending_count: count.pending_count,
        has_pending_items: count.has_pending_items,
    }))
}

/// Queue entry author.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueAuthorResponse {
    pub id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// One comment in the moderation queue.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueCommentResponse {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub status: String,
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<QueueAuthorResponse>,
}

impl From<QueueEntry> for QueueCommentResponse {
    fn from(entry: QueueEntry) -> Self {
        Self {
            id: entry.comment.id,
            content: entry.comment.content,
            created_at: entry.comment.created_at.to_rfc3339(),
            status: entry.comment.status.as_str().to_string(),
            post_id: entry.comment.post_id,
            user: entry.author.map(|author| QueueAuthorResponse {
                id: author.id,
                username: author.username,
                avatar_url: author.avatar_url,
            }),
        }
    }
}

/// Paging request for queue and user listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

const fn max_limit() -> u64 {
    200
}

/// Moderation queue response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub comments: Vec<QueueCommentResponse>,
    pub total: usize,
}

/// Comments awaiting review (pending and rejected), newest first.
async fn queue(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Query(req): Query<PageRequest>,
) -> AppResult<Json<QueueResponse>> {
    let limit = req.limit.min(max_limit());
    let entries = state
        .comment_service
        .moderation_queue(&actor, limit, req.offset)
        .await?;

    let comments: Vec<QueueCommentResponse> = entries.into_iter().map(Into::into).collect();
    let total = comments.len();

    Ok(Json(QueueResponse { comments, total }))
}

/// User listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<ModeratorUserResponse>,
    pub total: u64,
}

/// All profiles, newest first, for the user management panel.
async fn list_users(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Query(req): Query<PageRequest>,
) -> AppResult<Json<UserListResponse>> {
    let limit = req.limit.min(max_limit());
    let (users, total) = state
        .moderation_service
        .list_users(&actor, limit, req.offset)
        .await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Apply a subset of trust/ban/suspension fields to a user.
async fn update_user(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<UpdateUserStatusInput>,
) -> AppResult<Json<ModeratorUserResponse>> {
    let updated = state
        .moderation_service
        .apply(&actor, &user_id, input)
        .await?;
    Ok(Json(updated.into()))
}

/// Create the moderator router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending-count", get(pending_count))
        .route("/comments", get(queue))
        .route("/users", get(list_users))
        .route("/users/{id}", patch(update_user))
}
