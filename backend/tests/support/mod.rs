//! In-memory stores and app wiring shared by the HTTP integration tests.
#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use traveled_backend::handlers::configure_api;
use traveled_backend::models::{prefecture_rating, shared_map, visit};
use traveled_backend::repositories::{
    NewShare, NewVisit, ShareChanges, ShareStore, StoreError, StoreResult, VisitChanges,
    VisitStore,
};
use traveled_backend::services::blob_store::{BlobError, BlobStore};
use traveled_backend::services::export::MAX_EXPORT_BYTES;
use traveled_backend::state::AppState;
use traveled_backend::utils::auth::create_jwt;
use traveled_backend::utils::config::Config;

pub const JWT_SECRET: &str = "integration-secret";

#[derive(Default)]
pub struct InMemoryVisitStore {
    visits: Mutex<Vec<visit::Model>>,
    ratings: Mutex<Vec<prefecture_rating::Model>>,
}

#[async_trait]
impl VisitStore for InMemoryVisitStore {
    async fn list_visits(&self, user_id: Uuid) -> StoreResult<Vec<visit::Model>> {
        let mut visits: Vec<_> = self
            .visits
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        visits.sort_by(|a, b| {
            b.visit_year
                .cmp(&a.visit_year)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(visits)
    }

    async fn find_visit(&self, user_id: Uuid, visit_id: Uuid) -> StoreResult<Option<visit::Model>> {
        Ok(self
            .visits
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == visit_id && v.user_id == user_id)
            .cloned())
    }

    async fn insert_visit(&self, new_visit: NewVisit) -> StoreResult<visit::Model> {
        let now = Utc::now();
        let model = visit::Model {
            id: Uuid::new_v4(),
            user_id: new_visit.user_id,
            region_id: new_visit.region_id,
            country_id: new_visit.country_id,
            rating: new_visit.rating,
            visit_year: new_visit.visit_year,
            notes: new_visit.notes,
            created_at: now,
            updated_at: now,
        };
        self.visits.lock().unwrap().push(model.clone());
        Ok(model)
    }

    async fn update_visit(
        &self,
        user_id: Uuid,
        visit_id: Uuid,
        changes: VisitChanges,
    ) -> StoreResult<Option<visit::Model>> {
        let mut visits = self.visits.lock().unwrap();
        let Some(existing) = visits
            .iter_mut()
            .find(|v| v.id == visit_id && v.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(rating) = changes.rating {
            existing.rating = rating;
        }
        if let Some(year) = changes.visit_year {
            existing.visit_year = year;
        }
        if let Some(notes) = changes.notes {
            existing.notes = notes;
        }
        existing.updated_at = Utc::now();

        Ok(Some(existing.clone()))
    }

    async fn delete_visit(&self, user_id: Uuid, visit_id: Uuid) -> StoreResult<bool> {
        let mut visits = self.visits.lock().unwrap();
        let before = visits.len();
        visits.retain(|v| !(v.id == visit_id && v.user_id == user_id));
        Ok(visits.len() < before)
    }

    async fn delete_region_visits(&self, user_id: Uuid, region_id: &str) -> StoreResult<u64> {
        let mut visits = self.visits.lock().unwrap();
        let before = visits.len();
        visits.retain(|v| !(v.user_id == user_id && v.region_id == region_id));
        Ok((before - visits.len()) as u64)
    }

    async fn list_ratings(&self, user_id: Uuid) -> StoreResult<Vec<prefecture_rating::Model>> {
        Ok(self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_rating(
        &self,
        user_id: Uuid,
        region_id: &str,
        country_id: &str,
        star_rating: i32,
    ) -> StoreResult<prefecture_rating::Model> {
        let mut ratings = self.ratings.lock().unwrap();
        let now = Utc::now();

        if let Some(existing) = ratings.iter_mut().find(|r| {
            r.user_id == user_id && r.region_id == region_id && r.country_id == country_id
        }) {
            existing.star_rating = star_rating;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let model = prefecture_rating::Model {
            id: Uuid::new_v4(),
            user_id,
            region_id: region_id.to_string(),
            country_id: country_id.to_string(),
            star_rating,
            created_at: now,
            updated_at: now,
        };
        ratings.push(model.clone());
        Ok(model)
    }

    async fn delete_rating(
        &self,
        user_id: Uuid,
        region_id: &str,
        country_id: &str,
    ) -> StoreResult<bool> {
        let mut ratings = self.ratings.lock().unwrap();
        let before = ratings.len();
        ratings.retain(|r| {
            !(r.user_id == user_id && r.region_id == region_id && r.country_id == country_id)
        });
        Ok(ratings.len() < before)
    }
}

/// Enforces the same unique constraints as the `shared_maps` table
#[derive(Default)]
pub struct InMemoryShareStore {
    shares: Mutex<Vec<shared_map::Model>>,
    fail_insert: AtomicBool,
}

impl InMemoryShareStore {
    pub fn all(&self) -> Vec<shared_map::Model> {
        self.shares.lock().unwrap().clone()
    }

    pub fn view_count(&self, share_code: &str) -> Option<i32> {
        self.shares
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.share_code == share_code)
            .map(|s| s.view_count)
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ShareStore for InMemoryShareStore {
    async fn find_active_by_user(&self, user_id: Uuid) -> StoreResult<Option<shared_map::Model>> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id && s.is_active)
            .cloned())
    }

    async fn find_by_code(&self, share_code: &str) -> StoreResult<Option<shared_map::Model>> {
        Ok(self
            .shares
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.share_code == share_code)
            .cloned())
    }

    async fn code_exists(&self, share_code: &str) -> StoreResult<bool> {
        Ok(self.find_by_code(share_code).await?.is_some())
    }

    async fn insert(&self, new_share: NewShare) -> StoreResult<shared_map::Model> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset".to_string()));
        }

        let mut shares = self.shares.lock().unwrap();
        if shares.iter().any(|s| s.share_code == new_share.share_code) {
            return Err(StoreError::UniqueViolation("shared_maps_share_code_key".to_string()));
        }
        if shares
            .iter()
            .any(|s| s.user_id == new_share.user_id && s.is_active)
        {
            return Err(StoreError::UniqueViolation("uq_shared_maps_active_user".to_string()));
        }

        let now = Utc::now();
        let model = shared_map::Model {
            id: Uuid::new_v4(),
            user_id: new_share.user_id,
            share_code: new_share.share_code,
            image_url: new_share.image_url,
            title: new_share.title,
            description: new_share.description,
            is_active: true,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        shares.push(model.clone());
        Ok(model)
    }

    async fn update(&self, share_id: Uuid, changes: ShareChanges) -> StoreResult<shared_map::Model> {
        let mut shares = self.shares.lock().unwrap();

        if changes.is_active == Some(true) {
            let Some(user_id) = shares.iter().find(|s| s.id == share_id).map(|s| s.user_id) else {
                return Err(StoreError::Database("record not found".to_string()));
            };
            if shares
                .iter()
                .any(|s| s.user_id == user_id && s.is_active && s.id != share_id)
            {
                return Err(StoreError::UniqueViolation("uq_shared_maps_active_user".to_string()));
            }
        }

        let share = shares
            .iter_mut()
            .find(|s| s.id == share_id)
            .ok_or_else(|| StoreError::Database("record not found".to_string()))?;

        if let Some(title) = changes.title {
            share.title = title;
        }
        if let Some(description) = changes.description {
            share.description = description;
        }
        if let Some(is_active) = changes.is_active {
            share.is_active = is_active;
        }
        share.updated_at = Utc::now();

        Ok(share.clone())
    }

    async fn delete(&self, share_id: Uuid) -> StoreResult<bool> {
        let mut shares = self.shares.lock().unwrap();
        let before = shares.len();
        shares.retain(|s| s.id != share_id);
        Ok(shares.len() < before)
    }

    async fn increment_view_count(&self, share_code: &str) -> StoreResult<()> {
        if let Some(share) = self
            .shares
            .lock()
            .unwrap()
            .iter_mut()
            .find(|s| s.share_code == share_code)
        {
            share.view_count += 1;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_remove: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.blobs.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(path).cloned()
    }

    pub fn fail_removals(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), BlobError> {
        self.blobs.lock().unwrap().insert(path.to_string(), bytes);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), BlobError> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(BlobError::Io {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only bucket"),
            });
        }
        self.blobs.lock().unwrap().remove(path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://cdn.traveled.test/storage/{}", path)
    }
}

pub fn test_config(share_rate_limit_max: u32) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        host: "127.0.0.1".to_string(),
        port: 8080,
        jwt_secret: JWT_SECRET.to_string(),
        jwt_audience: None,
        frontend_url: "http://localhost:5173".to_string(),
        public_base_url: "https://cdn.traveled.test".to_string(),
        storage_dir: "storage".to_string(),
        share_rate_limit_max,
        share_rate_limit_window_secs: 86_400,
        export_pixel_ratio: 1.0,
        export_max_bytes: MAX_EXPORT_BYTES,
    }
}

pub struct TestContext {
    pub visits: Arc<InMemoryVisitStore>,
    pub shares: Arc<InMemoryShareStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub config: web::Data<Config>,
    state: web::Data<AppState>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_rate_limit(10)
    }

    pub fn with_rate_limit(share_rate_limit_max: u32) -> Self {
        Self::with_config(test_config(share_rate_limit_max))
    }

    pub fn with_config(config: Config) -> Self {
        let visits = Arc::new(InMemoryVisitStore::default());
        let shares = Arc::new(InMemoryShareStore::default());
        let blobs = Arc::new(InMemoryBlobStore::default());

        let state = web::Data::new(AppState::new(
            visits.clone(),
            shares.clone(),
            blobs.clone(),
            &config,
        ));

        Self {
            visits,
            shares,
            blobs,
            config: web::Data::new(config),
            state,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(self.config.clone())
            .configure(configure_api)
    }
}

/// `Authorization` header for `user_id`
pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    let token = create_jwt(user_id, JWT_SECRET, 1).unwrap();
    ("Authorization", format!("Bearer {}", token))
}
