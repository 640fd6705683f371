//! SeaORM Entity for the canonical GPU model catalog

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "gpu_models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Canonical slug every provider-specific GPU name is mapped onto
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub vram_gb: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
