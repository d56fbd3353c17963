use actix_web::{web, HttpResponse, Responder};

use crate::errors::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::statistics::compute_stats;
use crate::state::AppState;

/// GET /api/stats
pub async fn get_stats(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    let visits = state.visits.list_visits(user.user_id).await?;
    Ok(HttpResponse::Ok().json(compute_stats(&visits)))
}
