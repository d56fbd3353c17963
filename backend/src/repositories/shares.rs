use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

use super::{NewShare, ShareChanges, ShareStore, StoreError, StoreResult};
use crate::models::shared_map;

pub struct SeaOrmShareStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmShareStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShareStore for SeaOrmShareStore {
    async fn find_active_by_user(&self, user_id: Uuid) -> StoreResult<Option<shared_map::Model>> {
        let share = shared_map::Entity::find()
            .filter(shared_map::Column::UserId.eq(user_id))
            .filter(shared_map::Column::IsActive.eq(true))
            .order_by_desc(shared_map::Column::CreatedAt)
            .one(&*self.db)
            .await?;

        Ok(share)
    }

    async fn find_by_code(&self, share_code: &str) -> StoreResult<Option<shared_map::Model>> {
        let share = shared_map::Entity::find()
            .filter(shared_map::Column::ShareCode.eq(share_code))
            .one(&*self.db)
            .await?;

        Ok(share)
    }

    async fn code_exists(&self, share_code: &str) -> StoreResult<bool> {
        let count = shared_map::Entity::find()
            .filter(shared_map::Column::ShareCode.eq(share_code))
            .count(&*self.db)
            .await?;

        Ok(count > 0)
    }

    async fn insert(&self, new_share: NewShare) -> StoreResult<shared_map::Model> {
        let now = Utc::now();
        let model = shared_map::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_share.user_id),
            share_code: Set(new_share.share_code),
            image_url: Set(new_share.image_url),
            title: Set(new_share.title),
            description: Set(new_share.description),
            is_active: Set(true),
            view_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = shared_map::Entity::insert(model)
            .exec_with_returning(&*self.db)
            .await?;

        Ok(inserted)
    }

    async fn update(&self, share_id: Uuid, changes: ShareChanges) -> StoreResult<shared_map::Model> {
        let existing = shared_map::Entity::find_by_id(share_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| StoreError::Database(format!("Share {} not found", share_id)))?;

        let mut active: shared_map::ActiveModel = existing.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    async fn delete(&self, share_id: Uuid) -> StoreResult<bool> {
        let result = shared_map::Entity::delete_by_id(share_id)
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn increment_view_count(&self, share_code: &str) -> StoreResult<()> {
        shared_map::Entity::update_many()
            .col_expr(
                shared_map::Column::ViewCount,
                Expr::col(shared_map::Column::ViewCount).add(1),
            )
            .filter(shared_map::Column::ShareCode.eq(share_code))
            .filter(shared_map::Column::IsActive.eq(true))
            .exec(&*self.db)
            .await?;

        Ok(())
    }
}
