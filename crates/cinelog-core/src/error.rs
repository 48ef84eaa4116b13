use cinelog_tmdb::TmdbError;
use std::path::PathBuf;
use thiserror::Error;

/// Local store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database connection lock poisoned")]
    LockPoisoned,
}

/// Failures of repository operations that may reach the remote API.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("TMDB request failed: {0}")]
    Remote(#[from] TmdbError),

    #[error("remote metadata is unavailable (no TMDB client configured)")]
    RemoteUnavailable,
}

/// Backup/restore failures. A failed restore never leaves partial data behind.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backup not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid backup document: {0}")]
    InvalidDocument(String),

    #[error("unsupported backup version {0}")]
    UnsupportedVersion(u64),

    #[error("invalid backup name '{0}'")]
    InvalidName(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
