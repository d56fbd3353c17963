//! Data-access façade over the row store.
//!
//! Handlers and services talk to [`VisitStore`] and [`ShareStore`]; the sea-orm
//! adapters in this module are what production wires in.

pub mod shares;
pub mod visits;

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::models::{prefecture_rating, shared_map, visit};

pub use shares::SeaOrmShareStore;
pub use visits::SeaOrmVisitStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    UniqueViolation(String),

    #[error("{0}")]
    Database(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::UniqueViolation(detail),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct NewVisit {
    pub user_id: Uuid,
    pub region_id: String,
    pub country_id: String,
    pub rating: i32,
    pub visit_year: i32,
    pub notes: Option<String>,
}

/// Partial update; `notes: Some(None)` clears the notes
#[derive(Debug, Clone, Default)]
pub struct VisitChanges {
    pub rating: Option<i32>,
    pub visit_year: Option<i32>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewShare {
    pub user_id: Uuid,
    pub share_code: String,
    pub image_url: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShareChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Visits of a user, newest year first
    async fn list_visits(&self, user_id: Uuid) -> StoreResult<Vec<visit::Model>>;

    async fn find_visit(&self, user_id: Uuid, visit_id: Uuid) -> StoreResult<Option<visit::Model>>;

    async fn insert_visit(&self, new_visit: NewVisit) -> StoreResult<visit::Model>;

    /// Returns `None` when the visit does not exist or belongs to someone else
    async fn update_visit(
        &self,
        user_id: Uuid,
        visit_id: Uuid,
        changes: VisitChanges,
    ) -> StoreResult<Option<visit::Model>>;

    async fn delete_visit(&self, user_id: Uuid, visit_id: Uuid) -> StoreResult<bool>;

    async fn delete_region_visits(&self, user_id: Uuid, region_id: &str) -> StoreResult<u64>;

    async fn list_ratings(&self, user_id: Uuid) -> StoreResult<Vec<prefecture_rating::Model>>;

    async fn upsert_rating(
        &self,
        user_id: Uuid,
        region_id: &str,
        country_id: &str,
        star_rating: i32,
    ) -> StoreResult<prefecture_rating::Model>;

    async fn delete_rating(
        &self,
        user_id: Uuid,
        region_id: &str,
        country_id: &str,
    ) -> StoreResult<bool>;
}

#[async_trait]
pub trait ShareStore: Send + Sync {
    async fn find_active_by_user(&self, user_id: Uuid) -> StoreResult<Option<shared_map::Model>>;

    async fn find_by_code(&self, share_code: &str) -> StoreResult<Option<shared_map::Model>>;

    async fn code_exists(&self, share_code: &str) -> StoreResult<bool>;

    /// Fails with [`StoreError::UniqueViolation`] on a duplicate code or a
    /// second active share for the same user
    async fn insert(&self, new_share: NewShare) -> StoreResult<shared_map::Model>;

    async fn update(&self, share_id: Uuid, changes: ShareChanges) -> StoreResult<shared_map::Model>;

    async fn delete(&self, share_id: Uuid) -> StoreResult<bool>;

    async fn increment_view_count(&self, share_code: &str) -> StoreResult<()>;
}
