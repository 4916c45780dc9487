//! Comment repository.

use std::sync::Arc;

use crate::entities::{
    comment::{self, CommentStatus},
    Comment,
};
use backtalk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Which comments of a post a viewer may see.
///
/// The filter is applied in the store so pagination and totals line up
/// with what the caller is allowed to read.
#[derive(Debug, Clone)]
pub enum CommentVisibility {
    /// Approved comments only (anonymous viewers).
    Approved,
    /// Approved comments plus the viewer's own pending ones.
    ApprovedOrOwnPending {
        /// Profile ID of the viewer.
        viewer_id: String,
    },
    /// Every status, including rejected (moderator queue view).
    All,
}

impl CommentVisibility {
    fn condition(&self) -> Condition {
        match self {
            Self::Approved => {
                Condition::all().add(comment::Column::Status.eq(CommentStatus::Approved))
            }
            Self::ApprovedOrOwnPending { viewer_id } => Condition::any()
                .add(comment::Column::Status.eq(CommentStatus::Approved))
                .add(
                    Condition::all()
                        .add(comment::Column::Status.eq(CommentStatus::Pending))
                        .add(comment::Column::UserId.eq(viewer_id.clone())),
                ),
            Self::All => Condition::all(),
        }
    }
}

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete comments by ID.
    pub async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let res = Comment::delete_many()
            .filter(comment::Column::Id.is_in(ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }

    /// One page of a post's comments, newest first.
    pub async fn find_page_for_post(
        &self,
        post_id: &str,
        visibility: &CommentVisibility,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(visibility.condition())
            .order_by_desc(comment::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Total visible comments for a post, for pagination math.
    pub async fn count_for_post(
        &self,
        post_id: &str,
        visibility: &CommentVisibility,
    ) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(visibility.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All comments of a post, used to resolve reply chains before a
    /// cascade delete.
    pub async fn find_all_for_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comments awaiting moderation (pending and rejected), newest first,
    /// across all posts.
    pub async fn find_moderation_queue(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(
                comment::Column::Status
                    .is_in([CommentStatus::Pending, CommentStatus::Rejected]),
            )
            .order_by_desc(comment::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments with the given status across all posts.
    pub async fn count_by_status(&self, status: CommentStatus) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
