//! Append-only persistence for price readings.
//!
//! A reading is written only when it differs from the latest stored row
//! for the same (provider, gpu) pair, so re-running a scrape against an
//! unchanged source adds nothing. History is never updated in place.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, Order, QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};

use crate::entities::{prelude::*, prices};

/// A quote already resolved against the GPU catalog, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrice {
    pub gpu_model_id: i32,
    pub price_per_hour: Decimal,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First reading ever for this (provider, gpu) pair
    Inserted,
    /// Price moved; a new history row was appended
    Updated,
    /// Identical to the latest stored reading; nothing written
    Skipped,
}

impl UpsertStats {
    fn count(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// A batch write stopped partway. Carries what was already counted and
/// how many records never got attempted.
#[derive(Debug)]
pub struct UpsertAborted {
    pub partial: UpsertStats,
    pub remaining: usize,
    pub source: DbErr,
}

impl std::fmt::Display for UpsertAborted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "price batch aborted with {} records unwritten: {}",
            self.remaining, self.source
        )
    }
}

impl std::error::Error for UpsertAborted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Decide what a new reading means relative to the latest stored one.
pub fn classify(existing: Option<&Decimal>, incoming: &Decimal) -> UpsertOutcome {
    match existing {
        None => UpsertOutcome::Inserted,
        Some(current) if current == incoming => UpsertOutcome::Skipped,
        Some(_) => UpsertOutcome::Updated,
    }
}

fn latest_reading(provider_id: i32, gpu_model_id: i32) -> Select<Prices> {
    Prices::find()
        .filter(prices::Column::ProviderId.eq(provider_id))
        .filter(prices::Column::GpuModelId.eq(gpu_model_id))
        .order_by(prices::Column::CreatedAt, Order::Desc)
        .order_by(prices::Column::Id, Order::Desc)
}

/// Latest stored reading for one (provider, gpu) pair, if any.
pub async fn latest_price(
    db: &DatabaseConnection,
    provider_id: i32,
    gpu_model_id: i32,
) -> Result<Option<prices::Model>, DbErr> {
    latest_reading(provider_id, gpu_model_id).one(db).await
}

/// Write a batch of readings for one provider. Records are processed in
/// order; on a database error the batch stops and the error reports how
/// far it got.
pub async fn upsert_prices(
    db: &DatabaseConnection,
    provider_id: i32,
    records: &[ResolvedPrice],
) -> Result<UpsertStats, UpsertAborted> {
    let mut stats = UpsertStats::default();

    for (index, record) in records.iter().enumerate() {
        match upsert_one(db, provider_id, record).await {
            Ok(outcome) => stats.count(outcome),
            Err(source) => {
                return Err(UpsertAborted {
                    partial: stats,
                    remaining: records.len() - index,
                    source,
                });
            }
        }
    }

    Ok(stats)
}

async fn upsert_one(
    db: &DatabaseConnection,
    provider_id: i32,
    record: &ResolvedPrice,
) -> Result<UpsertOutcome, DbErr> {
    let txn = db.begin().await?;

    // Serialize concurrent writers touching the same (provider, gpu)
    // pair; the lock releases on commit/rollback
    txn.execute(sea_orm::Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1, $2)",
        [provider_id.into(), record.gpu_model_id.into()],
    ))
    .await?;

    let latest = latest_reading(provider_id, record.gpu_model_id)
        .one(&txn)
        .await?;

    let outcome = classify(latest.as_ref().map(|m| &m.price_per_hour), &record.price_per_hour);

    if outcome != UpsertOutcome::Skipped {
        let row = prices::ActiveModel {
            provider_id: Set(provider_id),
            gpu_model_id: Set(record.gpu_model_id),
            price_per_hour: Set(record.price_per_hour),
            source_url: Set(record.source_url.clone()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    txn.commit().await?;
    Ok(outcome)
}

/// Latest reading for every GPU a provider currently lists.
pub async fn current_prices_for_provider(
    db: &DatabaseConnection,
    provider_id: i32,
) -> Result<Vec<prices::Model>, DbErr> {
    // Raw SQL for PostgreSQL DISTINCT ON; id breaks created_at ties
    prices::Model::find_by_statement(sea_orm::Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        r#"
        SELECT DISTINCT ON (gpu_model_id)
            id, provider_id, gpu_model_id, price_per_hour, source_url, created_at
        FROM prices
        WHERE provider_id = $1
        ORDER BY gpu_model_id, created_at DESC, id DESC
        "#,
        [provider_id.into()],
    ))
    .all(db)
    .await
}

/// Latest reading per provider for one GPU model.
pub async fn current_prices_for_gpu(
    db: &DatabaseConnection,
    gpu_model_id: i32,
) -> Result<Vec<prices::Model>, DbErr> {
    prices::Model::find_by_statement(sea_orm::Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        r#"
        SELECT DISTINCT ON (provider_id)
            id, provider_id, gpu_model_id, price_per_hour, source_url, created_at
        FROM prices
        WHERE gpu_model_id = $1
        ORDER BY provider_id, created_at DESC, id DESC
        "#,
        [gpu_model_id.into()],
    ))
    .all(db)
    .await
}

/// All readings for one GPU between two days inclusive, oldest first.
pub async fn history_for_gpu(
    db: &DatabaseConnection,
    gpu_model_id: i32,
    from_day: NaiveDate,
    to_day: NaiveDate,
) -> Result<Vec<prices::Model>, DbErr> {
    let from = from_day.and_hms_opt(0, 0, 0).unwrap();
    let to_exclusive = (to_day + chrono::Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .unwrap();

    Prices::find()
        .filter(prices::Column::GpuModelId.eq(gpu_model_id))
        .filter(prices::Column::CreatedAt.gte(from))
        .filter(prices::Column::CreatedAt.lt(to_exclusive))
        .order_by(prices::Column::CreatedAt, Order::Asc)
        .order_by(prices::Column::Id, Order::Asc)
        .all(db)
        .await
}
