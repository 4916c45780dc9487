//! Comment endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use backtalk_common::{AppError, AppResult};
use backtalk_core::{
    CommentListing, CommentThread, ListCommentsQuery, SubmitCommentInput,
};
use backtalk_db::entities::{comment, comment::CommentStatus, profile};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
};

/// Comment author, as embedded in listings.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub is_moderator: bool,
}

impl From<profile::Model> for CommentAuthor {
    fn from(profile: profile::Model) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            avatar_url: profile.avatar_url,
            is_moderator: profile.is_moderator,
        }
    }
}

/// Comment response.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub mentions: Vec<String>,
    pub status: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<CommentAuthor>,
    /// Direct and indirect replies, oldest first. Only populated on
    /// top-level comments in listings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentResponse>,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        let mentions = comment.mention_list();
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            parent_id: comment.parent_id,
            content: comment.content,
            mentions,
            status: comment.status.as_str().to_string(),
            created_at: comment.created_at.to_rfc3339(),
            user: None,
            replies: Vec::new(),
        }
    }
}

impl CommentResponse {
    fn with_author(
        comment: comment::Model,
        authors: &HashMap<String, profile::Model>,
    ) -> Self {
        let author = authors.get(&comment.user_id).cloned();
        let mut response = Self::from(comment);
        response.user = author.map(Into::into);
        response
    }

    fn from_thread(thread: CommentThread, authors: &HashMap<String, profile::Model>) -> Self {
        let mut root = Self::with_author(thread.comment, authors);
        root.replies = thread
            .replies
            .into_iter()
            .map(|reply| Self::with_author(reply, authors))
            .collect();
        root
    }
}

/// Create comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Submit a new comment.
async fn create(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Json<CommentResponse>> {
    let input = SubmitCommentInput {
        post_id: req.post_id,
        content: req.content,
        parent_id: req.parent_id,
    };

    let comment = state.comment_service.submit(&actor, input).await?;
    Ok(Json(comment.into()))
}

/// List comments request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub post_id: String,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub include_pending: bool,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    15
}

/// Comment listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsResponse {
    pub comments: Vec<CommentResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// List one page of a post's comments, grouped into threads.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(req): Query<ListCommentsRequest>,
) -> AppResult<Json<ListCommentsResponse>> {
    let query = ListCommentsQuery {
        post_id: req.post_id,
        page: req.page,
        page_size: req.limit,
        include_pending: req.include_pending,
    };

    let CommentListing {
        threads,
        authors,
        total,
    } = state.comment_service.list(viewer.as_ref(), &query).await?;

    let comments = threads
        .into_iter()
        .map(|thread| CommentResponse::from_thread(thread, &authors))
        .collect();

    Ok(Json(ListCommentsResponse {
        comments,
        total,
        page: req.page.max(1),
        limit: req.limit.clamp(1, 100),
    }))
}

/// Update comment request: a status change (moderators) or a content
/// edit (owner). Status takes precedence when both are present.
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub status: Option<String>,
    pub content: Option<String>,
}

/// Moderate or edit a comment.
async fn update(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<Json<CommentResponse>> {
    if let Some(status) = req.status {
        let new_status = CommentStatus::parse(&status)
            .ok_or_else(|| AppError::Validation("Invalid status value".to_string()))?;
        let comment = state
            .comment_service
            .change_status(&actor, &comment_id, new_status)
            .await?;
        return Ok(Json(comment.into()));
    }

    if let Some(content) = req.content {
        let comment = state
            .comment_service
            .edit(&actor, &comment_id, &content)
            .await?;
        return Ok(Json(comment.into()));
    }

    Err(AppError::Validation(
        "No valid update fields provided".to_string(),
    ))
}

/// Delete comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentResponse {
    pub success: bool,
    pub deleted: u64,
}

/// Delete a comment and its replies.
async fn remove(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<Json<DeleteCommentResponse>> {
    let deleted = state.comment_service.delete(&actor, &comment_id).await?;
    Ok(Json(DeleteCommentResponse {
        success: true,
        deleted,
    }))
}

/// Create the comments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", delete(remove).patch(update))
}
