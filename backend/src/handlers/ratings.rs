use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::data::regions::COUNTRY_JAPAN;
use crate::errors::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::prefecture_rating;
use crate::state::AppState;
use crate::utils::validators::{validate_rating, validate_region};

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub region_id: String,
    pub country_id: String,
    pub star_rating: i32,
    pub updated_at: String,
}

impl From<prefecture_rating::Model> for RatingResponse {
    fn from(model: prefecture_rating::Model) -> Self {
        Self {
            region_id: model.region_id,
            country_id: model.country_id,
            star_rating: model.star_rating,
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpsertRatingRequest {
    pub star_rating: i32,
}

/// GET /api/ratings
pub async fn list_ratings(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    let ratings = state.visits.list_ratings(user.user_id).await?;
    let response: Vec<RatingResponse> = ratings.into_iter().map(RatingResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// PUT /api/ratings/{region_id}
/// Create or replace the star rating of a prefecture
pub async fn upsert_rating(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpsertRatingRequest>,
) -> Result<impl Responder, ApiError> {
    let region_id = path.into_inner();
    validate_region(&region_id).map_err(ApiError::validation)?;
    validate_rating(payload.star_rating, "Star rating").map_err(ApiError::validation)?;

    let rating = state
        .visits
        .upsert_rating(user.user_id, &region_id, COUNTRY_JAPAN, payload.star_rating)
        .await?;

    Ok(HttpResponse::Ok().json(RatingResponse::from(rating)))
}

/// DELETE /api/ratings/{region_id}
pub async fn delete_rating(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let region_id = path.into_inner();
    validate_region(&region_id).map_err(ApiError::validation)?;

    if !state
        .visits
        .delete_rating(user.user_id, &region_id, COUNTRY_JAPAN)
        .await?
    {
        return Err(ApiError::NotFound("Rating not found".to_string()));
    }

    Ok(HttpResponse::NoContent().finish())
}
