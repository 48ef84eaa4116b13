pub mod backup;
pub mod convert;
pub mod error;
pub mod maintenance;
pub mod repository;
pub mod runtime;
pub mod store;

pub use backup::{BackupDocument, BackupFile, BackupManager, RestoreSummary};
pub use convert::{planned_from_details, watched_from_details, watching_from_details, Details};
pub use error::{BackupError, RepositoryError, StoreError};
pub use maintenance::{repair_missing_runtimes, run_maintenance, MaintenanceOutcome, RuntimeRepairReport};
pub use repository::Repository;
pub use runtime::{estimate_runtime, typical_episode_runtime};
pub use store::{LibraryStats, SqliteStore};
