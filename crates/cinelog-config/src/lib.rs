pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{BackupConfig, Config, DisplayConfig, MaintenanceConfig, Theme, TmdbConfig, default_maintenance_config};
pub use credentials::{CredentialStore, TmdbAuth};
pub use paths::{PathManager, container_base_path};
