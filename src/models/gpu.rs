//! GPU catalog and current price response models

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::entities::gpu_models;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuDto {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub vram_gb: i32,
}

impl From<&gpu_models::Model> for GpuDto {
    fn from(model: &gpu_models::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug.clone(),
            name: model.name.clone(),
            vram_gb: model.vram_gb,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpusResponse {
    pub gpus: Vec<GpuDto>,
}

/// One provider's latest rate for a GPU
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPriceDto {
    pub provider: String,
    pub gpu_model: String,
    pub price_per_hour: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPricesResponse {
    pub data: Vec<CurrentPriceDto>,
}
