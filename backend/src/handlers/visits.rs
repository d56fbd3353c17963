use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::regions::COUNTRY_JAPAN;
use crate::errors::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::visit;
use crate::repositories::{NewVisit, VisitChanges};
use crate::state::AppState;
use crate::utils::validators::{validate_notes, validate_rating, validate_region, validate_visit_year};

#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub id: String,
    pub region_id: String,
    pub country_id: String,
    pub rating: i32,
    pub visit_year: i32,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<visit::Model> for VisitResponse {
    fn from(model: visit::Model) -> Self {
        Self {
            id: model.id.to_string(),
            region_id: model.region_id,
            country_id: model.country_id,
            rating: model.rating,
            visit_year: model.visit_year,
            notes: model.notes,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateVisitRequest {
    pub region_id: String,
    pub rating: i32,
    pub visit_year: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVisitRequest {
    pub rating: Option<i32>,
    pub visit_year: Option<i32>,
    /// Blank notes clear the field
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

/// Trimmed notes, `None` when blank
fn clean_notes(notes: &str) -> Result<Option<String>, ApiError> {
    let trimmed = notes.trim();
    validate_notes(trimmed).map_err(ApiError::validation)?;
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// GET /api/visits
pub async fn list_visits(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    let visits = state.visits.list_visits(user.user_id).await?;
    let response: Vec<VisitResponse> = visits.into_iter().map(VisitResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/visits
pub async fn create_visit(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateVisitRequest>,
) -> Result<impl Responder, ApiError> {
    let payload = payload.into_inner();

    validate_region(&payload.region_id).map_err(ApiError::validation)?;
    validate_rating(payload.rating, "Rating").map_err(ApiError::validation)?;
    validate_visit_year(payload.visit_year).map_err(ApiError::validation)?;
    let notes = match payload.notes.as_deref() {
        Some(notes) => clean_notes(notes)?,
        None => None,
    };

    let created = state
        .visits
        .insert_visit(NewVisit {
            user_id: user.user_id,
            region_id: payload.region_id,
            country_id: COUNTRY_JAPAN.to_string(),
            rating: payload.rating,
            visit_year: payload.visit_year,
            notes,
        })
        .await?;

    log::info!(
        "User {} recorded a visit to {} ({})",
        user.user_id,
        created.region_id,
        created.visit_year
    );

    Ok(HttpResponse::Created().json(VisitResponse::from(created)))
}

/// PATCH /api/visits/{id}
pub async fn update_visit(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateVisitRequest>,
) -> Result<impl Responder, ApiError> {
    let visit_id = path.into_inner();
    let payload = payload.into_inner();
    let mut changes = VisitChanges::default();

    if let Some(rating) = payload.rating {
        validate_rating(rating, "Rating").map_err(ApiError::validation)?;
        changes.rating = Some(rating);
    }

    if let Some(year) = payload.visit_year {
        validate_visit_year(year).map_err(ApiError::validation)?;
        changes.visit_year = Some(year);
    }

    if let Some(notes) = payload.notes.as_deref() {
        changes.notes = Some(clean_notes(notes)?);
    }

    let updated = state
        .visits
        .update_visit(user.user_id, visit_id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Visit not found".to_string()))?;

    Ok(HttpResponse::Ok().json(VisitResponse::from(updated)))
}

/// DELETE /api/visits/{id}
pub async fn delete_visit(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let visit_id = path.into_inner();

    if !state.visits.delete_visit(user.user_id, visit_id).await? {
        return Err(ApiError::NotFound("Visit not found".to_string()));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/visits/region/{region_id}
/// Remove every visit the user recorded for one prefecture
pub async fn delete_region_visits(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let region_id = path.into_inner();
    validate_region(&region_id).map_err(ApiError::validation)?;

    let deleted = state
        .visits
        .delete_region_visits(user.user_id, &region_id)
        .await?;

    log::info!(
        "User {} cleared {} visits to {}",
        user.user_id,
        deleted,
        region_id
    );

    Ok(HttpResponse::Ok().json(DeletedResponse { deleted }))
}
