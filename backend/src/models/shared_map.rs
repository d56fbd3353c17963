use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shared_maps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub share_code: String,

    // Public URL of the exported PNG
    pub image_url: String,
    pub title: String,
    pub description: Option<String>,

    pub is_active: bool,
    pub view_count: i32,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Blob path of the share image, `{user_id}/{share_code}.png`
    pub fn image_path(&self) -> String {
        image_path(self.user_id, &self.share_code)
    }
}

pub fn image_path(user_id: Uuid, share_code: &str) -> String {
    format!("{}/{}.png", user_id, share_code)
}
