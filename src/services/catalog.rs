//! Cached reference catalog: providers and canonical GPU models.
//!
//! Both tables are seeded by migration and change only when a migration
//! adds rows, so an hour of TTL is plenty.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Order, QueryOrder};

use crate::entities::{gpu_models, prelude::*, providers};

const CACHE_KEY: &str = "reference";

pub struct Catalog {
    pub providers: Vec<providers::Model>,
    pub gpus: Vec<gpu_models::Model>,
    provider_ids: HashMap<String, i32>,
    gpu_ids: HashMap<String, i32>,
}

impl Catalog {
    pub fn new(providers: Vec<providers::Model>, gpus: Vec<gpu_models::Model>) -> Self {
        let provider_ids = providers.iter().map(|p| (p.slug.clone(), p.id)).collect();
        let gpu_ids = gpus.iter().map(|g| (g.slug.clone(), g.id)).collect();
        Self {
            providers,
            gpus,
            provider_ids,
            gpu_ids,
        }
    }

    pub async fn load(db: &DatabaseConnection) -> Result<Self, DbErr> {
        let providers = Providers::find()
            .order_by(providers::Column::Id, Order::Asc)
            .all(db)
            .await?;
        let gpus = GpuModels::find()
            .order_by(gpu_models::Column::Id, Order::Asc)
            .all(db)
            .await?;
        Ok(Self::new(providers, gpus))
    }

    pub fn provider_id(&self, slug: &str) -> Option<i32> {
        self.provider_ids.get(slug).copied()
    }

    pub fn gpu_id(&self, slug: &str) -> Option<i32> {
        self.gpu_ids.get(slug).copied()
    }

    pub fn gpu_by_id(&self, id: i32) -> Option<&gpu_models::Model> {
        self.gpus.iter().find(|g| g.id == id)
    }

    pub fn provider_by_id(&self, id: i32) -> Option<&providers::Model> {
        self.providers.iter().find(|p| p.id == id)
    }
}

#[derive(Clone)]
pub struct CatalogCache {
    cache: Arc<Cache<String, Arc<Catalog>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(3600)) // 1 hour TTL
            .build();

        Self {
            cache: Arc::new(cache),
        }
    }

    pub async fn get(&self, db: &DatabaseConnection) -> Result<Arc<Catalog>, DbErr> {
        if let Some(catalog) = self.cache.get(CACHE_KEY).await {
            tracing::debug!("Reference catalog cache hit");
            return Ok(catalog);
        }

        tracing::info!("Loading reference catalog from database");
        let catalog = Arc::new(Catalog::load(db).await?);
        self.cache
            .insert(CACHE_KEY.to_string(), catalog.clone())
            .await;

        Ok(catalog)
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}
