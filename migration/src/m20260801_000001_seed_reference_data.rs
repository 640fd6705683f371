use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Providers the scrape pipeline knows how to talk to.
const PROVIDERS: &[(&str, &str)] = &[
    ("aws", "Amazon Web Services"),
    ("coreweave", "CoreWeave"),
    ("lambda", "Lambda Labs"),
    ("vast", "Vast.ai"),
];

/// Canonical GPU models: (slug, display name, VRAM in GB).
const GPU_MODELS: &[(&str, &str, i32)] = &[
    ("h100-sxm", "NVIDIA H100 SXM", 80),
    ("h100-pcie", "NVIDIA H100 PCIe", 80),
    ("a100-sxm", "NVIDIA A100 SXM 80GB", 80),
    ("a100-pcie", "NVIDIA A100 PCIe 40GB", 40),
    ("l40s", "NVIDIA L40S", 48),
    ("l4", "NVIDIA L4", 24),
    ("a10", "NVIDIA A10", 24),
    ("a6000", "NVIDIA RTX A6000", 48),
    ("rtx-4090", "NVIDIA GeForce RTX 4090", 24),
    ("rtx-3090", "NVIDIA GeForce RTX 3090", 24),
    ("v100", "NVIDIA Tesla V100", 16),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Seed the supported providers
        for (slug, name) in PROVIDERS {
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(Providers::Table)
                        .columns([Providers::Slug, Providers::Name])
                        .values_panic([(*slug).into(), (*name).into()])
                        .to_owned(),
                )
                .await?;
        }

        // Seed the canonical GPU catalog
        for (slug, name, vram_gb) in GPU_MODELS {
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(GpuModels::Table)
                        .columns([GpuModels::Slug, GpuModels::Name, GpuModels::VramGb])
                        .values_panic([(*slug).into(), (*name).into(), (*vram_gb).into()])
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Price rows reference both tables, so they have to go first
        manager
            .exec_stmt(Query::delete().from_table(Prices::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(GpuModels::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Providers::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Providers {
    Table,
    Slug,
    Name,
}

#[derive(DeriveIden)]
enum GpuModels {
    Table,
    Slug,
    Name,
    VramGb,
}

#[derive(DeriveIden)]
enum Prices {
    Table,
}
