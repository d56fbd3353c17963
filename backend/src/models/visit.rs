use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub region_id: String,
    pub country_id: String,

    // 0 (never been) .. 5 (lived there)
    pub rating: i32,
    pub visit_year: i32,
    pub notes: Option<String>,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Labels for the visit rating scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitRating {
    NeverBeen,
    PassedThrough,
    SetFoot,
    Visited,
    StayedOvernight,
    LivedThere,
}

impl VisitRating {
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(VisitRating::NeverBeen),
            1 => Some(VisitRating::PassedThrough),
            2 => Some(VisitRating::SetFoot),
            3 => Some(VisitRating::Visited),
            4 => Some(VisitRating::StayedOvernight),
            5 => Some(VisitRating::LivedThere),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisitRating::NeverBeen => "Never been",
            VisitRating::PassedThrough => "Passed through",
            VisitRating::SetFoot => "Set foot",
            VisitRating::Visited => "Visited",
            VisitRating::StayedOvernight => "Stayed overnight",
            VisitRating::LivedThere => "Lived there",
        }
    }
}
