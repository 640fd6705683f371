pub use super::gpu_models::Entity as GpuModels;
pub use super::prices::Entity as Prices;
pub use super::providers::Entity as Providers;
