//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod asset_repo;
pub mod dashboard_repo;
pub mod detection_metric_repo;
pub mod experience_asset_repo;
pub mod experience_repo;
pub mod target_repo;

pub use asset_repo::AssetRepo;
pub use dashboard_repo::DashboardRepo;
pub use detection_metric_repo::DetectionMetricRepo;
pub use experience_asset_repo::ExperienceAssetRepo;
pub use experience_repo::ExperienceRepo;
pub use target_repo::TargetRepo;
