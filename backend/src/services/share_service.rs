//! Creating, updating, viewing and deleting shared maps.
//!
//! A share owns two resources: the row in `shared_maps` and the exported PNG in
//! the blob store. Creation uploads the image before inserting the row and
//! removes it again if the insert fails. Deletion removes the image first and
//! deletes the row even when the image cannot be removed.

use anyhow::{anyhow, Context};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::shared_map;
use crate::repositories::{NewShare, ShareChanges, ShareStore, StoreError, VisitStore};
use crate::services::blob_store::BlobStore;
use crate::services::export::{compress_png, ExportPipeline, ExportedImage, COMPRESSION_THRESHOLD_BYTES};
use crate::services::map_renderer::{render_map_svg, MapStyle};
use crate::services::share_lifecycle::{ShareLifecycle, ShareState};
use crate::utils::share_code::generate_share_code;
use crate::utils::validators::{
    is_valid_share_code, validate_share_description, validate_share_title,
};

const MAX_CODE_ATTEMPTS: usize = 10;
const ACTIVE_SHARE_EXISTS: &str = "You already have an active shared map";

/// Fields a share owner can change; `None` leaves the field as it is
#[derive(Debug, Clone, Default)]
pub struct ShareUpdate {
    pub title: Option<String>,
    /// A blank description clears it
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub struct ShareService {
    shares: Arc<dyn ShareStore>,
    visits: Arc<dyn VisitStore>,
    blobs: Arc<dyn BlobStore>,
    lifecycle: ShareLifecycle,
    map_style: MapStyle,
    pixel_ratio: f32,
    max_export_bytes: usize,
}

impl ShareService {
    pub fn new(
        shares: Arc<dyn ShareStore>,
        visits: Arc<dyn VisitStore>,
        blobs: Arc<dyn BlobStore>,
        pixel_ratio: f32,
        max_export_bytes: usize,
    ) -> Self {
        Self {
            shares,
            visits,
            blobs,
            lifecycle: ShareLifecycle::new(),
            map_style: MapStyle::default(),
            pixel_ratio,
            max_export_bytes,
        }
    }

    pub async fn current(&self, user_id: Uuid) -> Result<Option<shared_map::Model>, ApiError> {
        Ok(self.shares.find_active_by_user(user_id).await?)
    }

    /// Where the caller's share is in its lifecycle, including in-flight work
    pub async fn status(&self, user_id: Uuid) -> Result<ShareState, ApiError> {
        let has_active = self.shares.find_active_by_user(user_id).await?.is_some();
        Ok(self.lifecycle.state(user_id, has_active))
    }

    /// Render the caller's map without storing or publishing anything
    pub async fn preview(
        &self,
        user_id: Uuid,
        title: Option<&str>,
    ) -> Result<ExportedImage, ApiError> {
        let title = title
            .map(validate_share_title)
            .transpose()
            .map_err(ApiError::validation)?;

        let visits = self.visits.list_visits(user_id).await?;
        self.export_map(visits, title).await
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
    ) -> Result<shared_map::Model, ApiError> {
        let title = validate_share_title(title).map_err(ApiError::validation)?;
        let description = validate_share_description(description).map_err(ApiError::validation)?;

        let _guard = self.lifecycle.begin_generating(user_id)?;

        if self.shares.find_active_by_user(user_id).await?.is_some() {
            return Err(ApiError::Conflict(ACTIVE_SHARE_EXISTS.to_string()));
        }

        let visits = self.visits.list_visits(user_id).await?;
        let image = self.export_map(visits, Some(title.clone())).await?;

        let share_code = self.unique_share_code().await?;
        let path = shared_map::image_path(user_id, &share_code);

        self.blobs.upload(&path, image.bytes, "image/png").await?;
        let image_url = self.blobs.public_url(&path);

        let inserted = self
            .shares
            .insert(NewShare {
                user_id,
                share_code: share_code.clone(),
                image_url,
                title,
                description,
            })
            .await;

        match inserted {
            Ok(share) => {
                log::info!(
                    "✅ User {} created shared map {} ({}x{})",
                    user_id,
                    share_code,
                    image.width,
                    image.height
                );
                Ok(share)
            }
            Err(e) => {
                if let Err(cleanup) = self.blobs.remove(&path).await {
                    log::error!("Failed to remove orphaned share image {}: {}", path, cleanup);
                }
                Err(share_conflict(e))
            }
        }
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        share_code: &str,
        update: ShareUpdate,
    ) -> Result<shared_map::Model, ApiError> {
        let share = self.owned_share(user_id, share_code).await?;
        let mut changes = ShareChanges::default();

        if let Some(title) = update.title {
            changes.title = Some(validate_share_title(&title).map_err(ApiError::validation)?);
        }

        if let Some(description) = update.description {
            changes.description = Some(
                validate_share_description(Some(&description)).map_err(ApiError::validation)?,
            );
        }

        if let Some(is_active) = update.is_active {
            if is_active && !share.is_active {
                let other = self.shares.find_active_by_user(user_id).await?;
                if other.is_some_and(|other| other.id != share.id) {
                    return Err(ApiError::Conflict(ACTIVE_SHARE_EXISTS.to_string()));
                }
            }
            changes.is_active = Some(is_active);
        }

        self.shares
            .update(share.id, changes)
            .await
            .map_err(share_conflict)
    }

    pub async fn delete(&self, user_id: Uuid, share_code: &str) -> Result<(), ApiError> {
        let share = self.owned_share(user_id, share_code).await?;
        self.remove(share).await
    }

    pub async fn delete_current(&self, user_id: Uuid) -> Result<(), ApiError> {
        let share = self
            .shares
            .find_active_by_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("No active shared map".to_string()))?;
        self.remove(share).await
    }

    /// Public lookup; the view counter is bumped in the background
    pub async fn view(&self, share_code: &str) -> Result<shared_map::Model, ApiError> {
        if !is_valid_share_code(share_code) {
            return Err(ApiError::Validation("Invalid share code".to_string()));
        }

        let share = self
            .shares
            .find_by_code(share_code)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| ApiError::NotFound("Shared map not found".to_string()))?;

        let shares = Arc::clone(&self.shares);
        let code = share.share_code.clone();
        tokio::spawn(async move {
            if let Err(e) = shares.increment_view_count(&code).await {
                log::warn!("Failed to increment view count for {}: {}", code, e);
            }
        });

        Ok(share)
    }

    async fn remove(&self, share: shared_map::Model) -> Result<(), ApiError> {
        let _guard = self.lifecycle.begin_deleting(share.user_id)?;

        let path = share.image_path();
        if let Err(e) = self.blobs.remove(&path).await {
            log::error!(
                "Failed to remove share image {}, deleting the record anyway: {}",
                path,
                e
            );
        }

        if !self.shares.delete(share.id).await? {
            return Err(ApiError::NotFound("Shared map not found".to_string()));
        }

        log::info!("🗑️  User {} deleted shared map {}", share.user_id, share.share_code);
        Ok(())
    }

    async fn owned_share(
        &self,
        user_id: Uuid,
        share_code: &str,
    ) -> Result<shared_map::Model, ApiError> {
        if !is_valid_share_code(share_code) {
            return Err(ApiError::Validation("Invalid share code".to_string()));
        }

        self.shares
            .find_by_code(share_code)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound("Shared map not found".to_string()))
    }

    async fn unique_share_code(&self) -> Result<String, ApiError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_share_code();
            if !self.shares.code_exists(&code).await? {
                return Ok(code);
            }
            log::warn!("Share code collision on attempt {}", attempt);
        }

        Err(anyhow!(
            "Could not generate a unique share code after {} attempts",
            MAX_CODE_ATTEMPTS
        )
        .into())
    }

    async fn export_map(
        &self,
        visits: Vec<crate::models::visit::Model>,
        title: Option<String>,
    ) -> Result<ExportedImage, ApiError> {
        let style = self.map_style.clone();
        let pixel_ratio = self.pixel_ratio;
        let max_bytes = self.max_export_bytes;

        let image = tokio::task::spawn_blocking(move || {
            let svg = render_map_svg(&visits, &style, title.as_deref());
            let image = ExportPipeline::with_pixel_ratio(pixel_ratio)
                .with_max_bytes(max_bytes)
                .export(&svg)?;
            compress_png(image, COMPRESSION_THRESHOLD_BYTES)
        })
        .await
        .context("Map export task failed")??;

        Ok(image)
    }
}

fn share_conflict(err: StoreError) -> ApiError {
    match err {
        StoreError::UniqueViolation(detail) => {
            log::warn!("Share insert hit a unique constraint: {}", detail);
            ApiError::Conflict(ACTIVE_SHARE_EXISTS.to_string())
        }
        other => other.into(),
    }
}
