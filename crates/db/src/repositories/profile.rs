//! Profile repository.

use std::sync::Arc;

use crate::entities::{profile, Profile};
use backtalk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(id.to_string()))
    }

    /// Find profiles by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<profile::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Profile::find()
            .filter(profile::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List profiles, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<profile::Model>> {
        Profile::find()
            .order_by_desc(profile::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all profiles.
    pub async fn count(&self) -> AppResult<u64> {
        Profile::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
