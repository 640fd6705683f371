use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GpuModels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GpuModels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GpuModels::Slug)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(GpuModels::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GpuModels::VramGb)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index for fast slug lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_gpu_models_slug")
                    .table(GpuModels::Table)
                    .col(GpuModels::Slug)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GpuModels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GpuModels {
    Table,
    Id,
    Slug,
    Name,
    VramGb,
}
