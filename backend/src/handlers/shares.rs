use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use serde::{Deserialize, Serialize};

use crate::errors::{insert_rate_limit_headers, ApiError};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::shared_map;
use crate::services::rate_limiter::client_key;
use crate::services::share_lifecycle::ShareState;
use crate::services::share_service::ShareUpdate;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub id: String,
    pub share_code: String,
    pub image_url: String,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub view_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<shared_map::Model> for ShareResponse {
    fn from(model: shared_map::Model) -> Self {
        Self {
            id: model.id.to_string(),
            share_code: model.share_code,
            image_url: model.image_url,
            title: model.title,
            description: model.description,
            is_active: model.is_active,
            view_count: model.view_count,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// What anonymous viewers of a share get to see
#[derive(Debug, Serialize)]
pub struct PublicShareResponse {
    pub share_code: String,
    pub image_url: String,
    pub title: String,
    pub description: Option<String>,
    pub view_count: i32,
    pub created_at: String,
}

impl From<shared_map::Model> for PublicShareResponse {
    fn from(model: shared_map::Model) -> Self {
        Self {
            share_code: model.share_code,
            image_url: model.image_url,
            title: model.title,
            description: model.description,
            view_count: model.view_count,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShareStatusResponse {
    pub state: ShareState,
    /// Generating or deleting; clients poll until this clears
    pub busy: bool,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateShareRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShareRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

// ============ Handlers ============

/// GET /api/shares
/// The caller's active share, or `null`
pub async fn get_current_share(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    let share = state.shares.current(user.user_id).await?;
    Ok(HttpResponse::Ok().json(share.map(ShareResponse::from)))
}

/// GET /api/shares/status
pub async fn get_share_status(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    let share_state = state.shares.status(user.user_id).await?;
    Ok(HttpResponse::Ok().json(ShareStatusResponse {
        state: share_state,
        busy: share_state.is_transient(),
    }))
}

/// GET /api/shares/preview?title=...
/// The exported map as a data URL, nothing is stored
pub async fn preview_share(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<PreviewQuery>,
) -> Result<impl Responder, ApiError> {
    let image = state
        .shares
        .preview(user.user_id, query.title.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(PreviewResponse {
        data_url: image.data_url(),
        width: image.width,
        height: image.height,
        size: image.size_label(),
    }))
}

/// POST /api/shares
/// Export the caller's map and publish it under a new share code
pub async fn create_share(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateShareRequest>,
) -> Result<HttpResponse, ApiError> {
    let key = client_key(&req);
    let decision = state.share_rate_limiter.check(&key);

    if !decision.success {
        log::warn!("⚠️  Share creation rate limit hit for {}", key);
        return Err(ApiError::RateLimited {
            remaining: decision.remaining,
            reset_time: decision.reset_time,
        });
    }

    let payload = payload.into_inner();
    let created = state
        .shares
        .create(user.user_id, &payload.title, payload.description.as_deref())
        .await;

    let mut response = match created {
        Ok(share) => HttpResponse::Created().json(ShareResponse::from(share)),
        Err(e) => e.error_response(),
    };
    insert_rate_limit_headers(response.headers_mut(), decision.remaining, &decision.reset_time);

    Ok(response)
}

/// DELETE /api/shares
pub async fn delete_current_share(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    state.shares.delete_current(user.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/shares/{code}
/// Public view of an active share
pub async fn view_share(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let share = state.shares.view(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PublicShareResponse::from(share)))
}

/// PATCH /api/shares/{code}
pub async fn update_share(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateShareRequest>,
) -> Result<impl Responder, ApiError> {
    let payload = payload.into_inner();
    let share = state
        .shares
        .update(
            user.user_id,
            &path.into_inner(),
            ShareUpdate {
                title: payload.title,
                description: payload.description,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ShareResponse::from(share)))
}

/// DELETE /api/shares/{code}
pub async fn delete_share(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    state
        .shares
        .delete(user.user_id, &path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
