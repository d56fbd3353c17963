use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

use super::{NewVisit, StoreResult, VisitChanges, VisitStore};
use crate::models::{prefecture_rating, visit};

pub struct SeaOrmVisitStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmVisitStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VisitStore for SeaOrmVisitStore {
    async fn list_visits(&self, user_id: Uuid) -> StoreResult<Vec<visit::Model>> {
        let visits = visit::Entity::find()
            .filter(visit::Column::UserId.eq(user_id))
            .order_by_desc(visit::Column::VisitYear)
            .order_by_desc(visit::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(visits)
    }

    async fn find_visit(&self, user_id: Uuid, visit_id: Uuid) -> StoreResult<Option<visit::Model>> {
        let found = visit::Entity::find_by_id(visit_id)
            .filter(visit::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?;

        Ok(found)
    }

    async fn insert_visit(&self, new_visit: NewVisit) -> StoreResult<visit::Model> {
        let now = Utc::now();
        let model = visit::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_visit.user_id),
            region_id: Set(new_visit.region_id),
            country_id: Set(new_visit.country_id),
            rating: Set(new_visit.rating),
            visit_year: Set(new_visit.visit_year),
            notes: Set(new_visit.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = visit::Entity::insert(model)
            .exec_with_returning(&*self.db)
            .await?;

        Ok(inserted)
    }

    async fn update_visit(
        &self,
        user_id: Uuid,
        visit_id: Uuid,
        changes: VisitChanges,
    ) -> StoreResult<Option<visit::Model>> {
        let Some(existing) = self.find_visit(user_id, visit_id).await? else {
            return Ok(None);
        };

        let mut active: visit::ActiveModel = existing.into();

        if let Some(rating) = changes.rating {
            active.rating = Set(rating);
        }
        if let Some(visit_year) = changes.visit_year {
            active.visit_year = Set(visit_year);
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        Ok(Some(updated))
    }

    async fn delete_visit(&self, user_id: Uuid, visit_id: Uuid) -> StoreResult<bool> {
        let result = visit::Entity::delete_many()
            .filter(visit::Column::Id.eq(visit_id))
            .filter(visit::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn delete_region_visits(&self, user_id: Uuid, region_id: &str) -> StoreResult<u64> {
        let result = visit::Entity::delete_many()
            .filter(visit::Column::UserId.eq(user_id))
            .filter(visit::Column::RegionId.eq(region_id))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn list_ratings(&self, user_id: Uuid) -> StoreResult<Vec<prefecture_rating::Model>> {
        let ratings = prefecture_rating::Entity::find()
            .filter(prefecture_rating::Column::UserId.eq(user_id))
            .order_by_asc(prefecture_rating::Column::RegionId)
            .all(&*self.db)
            .await?;

        Ok(ratings)
    }

    async fn upsert_rating(
        &self,
        user_id: Uuid,
        region_id: &str,
        country_id: &str,
        star_rating: i32,
    ) -> StoreResult<prefecture_rating::Model> {
        let now = Utc::now();
        let model = prefecture_rating::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            region_id: Set(region_id.to_string()),
            country_id: Set(country_id.to_string()),
            star_rating: Set(star_rating),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let saved = prefecture_rating::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    prefecture_rating::Column::UserId,
                    prefecture_rating::Column::RegionId,
                    prefecture_rating::Column::CountryId,
                ])
                .update_columns([
                    prefecture_rating::Column::StarRating,
                    prefecture_rating::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_with_returning(&*self.db)
            .await?;

        Ok(saved)
    }

    async fn delete_rating(
        &self,
        user_id: Uuid,
        region_id: &str,
        country_id: &str,
    ) -> StoreResult<bool> {
        let result = prefecture_rating::Entity::delete_many()
            .filter(prefecture_rating::Column::UserId.eq(user_id))
            .filter(prefecture_rating::Column::RegionId.eq(region_id))
            .filter(prefecture_rating::Column::CountryId.eq(country_id))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
