pub mod backup;
pub mod catalog;
pub mod config;
pub mod library;
pub mod maintenance;
pub mod prompts;
pub mod ui;

use cinelog_config::{Config, CredentialStore, PathManager};
use cinelog_core::{Repository, SqliteStore};
use cinelog_tmdb::{TmdbClient, TmdbError, TmdbSettings};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::debug;

/// Everything a command needs: paths, validated config and the repository.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub repo: Repository<TmdbClient>,
}

impl AppContext {
    /// Repository without TMDB access, for purely local commands.
    pub fn local() -> Result<Self> {
        let paths = PathManager::default();
        let config = load_config(&paths)?;
        let repo = Repository::local(open_store(&paths)?);
        Ok(Self { paths, config, repo })
    }

    /// Repository with a TMDB client; fails when no credentials are configured.
    pub fn remote() -> Result<Self> {
        let paths = PathManager::default();
        let config = load_config(&paths)?;
        let client = tmdb_client(&paths, &config)?;
        let repo = Repository::new(open_store(&paths)?, client);
        Ok(Self { paths, config, repo })
    }
}

pub fn load_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

fn open_store(paths: &PathManager) -> Result<SqliteStore> {
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
    let db_file = paths.database_file();
    debug!(operation = "open_store", path = %db_file.display(), "Opening library");
    SqliteStore::open(&db_file).map_err(|e| eyre!("Failed to open library at {}: {}", db_file.display(), e))
}

fn tmdb_client(paths: &PathManager, config: &Config) -> Result<TmdbClient> {
    let credentials_file = paths.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    TmdbClient::from_credentials(TmdbSettings::from_config(config), &cred_store).map_err(|e| match e {
        TmdbError::MissingCredentials => eyre!(
            "TMDB credentials not configured. Run 'cinelog config tmdb' or set TMDB_ACCESS_TOKEN / TMDB_API_KEY."
        ),
        other => eyre!("Failed to create TMDB client: {}", other),
    })
}
