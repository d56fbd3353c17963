use actix_web::{HttpResponse, Responder};
use serde::Serialize;

use crate::data::regions::{self, MacroRegion};

#[derive(Debug, Serialize)]
pub struct RegionResponse {
    pub id: &'static str,
    pub code: u8,
    pub name: &'static str,
    pub name_ja: &'static str,
    pub country_id: &'static str,
    pub macro_region: MacroRegion,
    pub macro_region_name: &'static str,
}

/// GET /api/regions
/// Static prefecture list, in JIS code order
pub async fn list_regions() -> impl Responder {
    let response: Vec<RegionResponse> = regions::all()
        .iter()
        .map(|r| RegionResponse {
            id: r.id,
            code: r.code,
            name: r.name,
            name_ja: r.name_ja,
            country_id: regions::COUNTRY_JAPAN,
            macro_region: r.macro_region,
            macro_region_name: r.macro_region.name(),
        })
        .collect();

    HttpResponse::Ok().json(response)
}
