pub mod health;
pub mod ratings;
pub mod regions;
pub mod shares;
pub mod stats;
pub mod visits;

use actix_web::web;

/// Routes under `/api`
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/regions", web::get().to(regions::list_regions))
            .service(
                web::scope("/visits")
                    .route("", web::get().to(visits::list_visits))
                    .route("", web::post().to(visits::create_visit))
                    .route(
                        "/region/{region_id}",
                        web::delete().to(visits::delete_region_visits),
                    )
                    .route("/{id}", web::patch().to(visits::update_visit))
                    .route("/{id}", web::delete().to(visits::delete_visit)),
            )
            .service(
                web::scope("/ratings")
                    .route("", web::get().to(ratings::list_ratings))
                    .route("/{region_id}", web::put().to(ratings::upsert_rating))
                    .route("/{region_id}", web::delete().to(ratings::delete_rating)),
            )
            .route("/stats", web::get().to(stats::get_stats))
            .service(
                web::scope("/shares")
                    .route("", web::get().to(shares::get_current_share))
                    .route("", web::post().to(shares::create_share))
                    .route("", web::delete().to(shares::delete_current_share))
                    .route("/status", web::get().to(shares::get_share_status))
                    .route("/preview", web::get().to(shares::preview_share))
                    // Public, no authentication
                    .route("/{code}", web::get().to(shares::view_share))
                    .route("/{code}", web::patch().to(shares::update_share))
                    .route("/{code}", web::delete().to(shares::delete_share)),
            ),
    );
}
