use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only price readings, one row per observed price change
        manager
            .create_table(
                Table::create()
                    .table(Prices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Prices::ProviderId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Prices::GpuModelId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Prices::PricePerHour)
                            .decimal_len(10, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Prices::SourceUrl)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Prices::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Foreign key to providers
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_prices_provider_id")
                    .from(Prices::Table, Prices::ProviderId)
                    .to(Providers::Table, Providers::Id)
                    .to_owned(),
            )
            .await?;

        // Foreign key to gpu_models
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_prices_gpu_model_id")
                    .from(Prices::Table, Prices::GpuModelId)
                    .to(GpuModels::Table, GpuModels::Id)
                    .to_owned(),
            )
            .await?;

        // Latest-row lookups per (provider, gpu) pair
        manager
            .create_index(
                Index::create()
                    .name("idx_prices_provider_gpu_created")
                    .table(Prices::Table)
                    .col(Prices::ProviderId)
                    .col(Prices::GpuModelId)
                    .col(Prices::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Trend queries scan one GPU across providers by time
        manager
            .create_index(
                Index::create()
                    .name("idx_prices_gpu_created")
                    .table(Prices::Table)
                    .col(Prices::GpuModelId)
                    .col(Prices::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Prices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Prices {
    Table,
    Id,
    ProviderId,
    GpuModelId,
    PricePerHour,
    SourceUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Providers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum GpuModels {
    Table,
    Id,
}
