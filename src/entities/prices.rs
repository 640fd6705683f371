//! SeaORM Entity for append-only price readings

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub provider_id: i32,
    pub gpu_model_id: i32,
    /// Hourly USD rate for a single GPU
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub price_per_hour: Decimal,
    /// Page or API endpoint the reading came from
    #[sea_orm(nullable)]
    pub source_url: Option<String>,
    /// Observation time (UTC); rows are never updated after insert
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
