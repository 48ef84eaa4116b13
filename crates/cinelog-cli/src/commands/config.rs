use super::{load_config, prompts, ui};
use crate::output::Output;
use crate::ConfigCommands;
use cinelog_config::{Config, CredentialStore, PathManager, Theme};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Tmdb { api_key, access_token } => configure_tmdb(api_key, access_token, output),
        ConfigCommands::Display { theme, locale } => configure_display(theme, locale, output),
    }
}

/// Keep the first and last four characters of a secret.
fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
    }
}

fn load_credentials(paths: &PathManager) -> Result<CredentialStore> {
    let credentials_file = paths.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    Ok(cred_store)
}

fn save_config(config: &Config, paths: &PathManager) -> Result<()> {
    config
        .validate()
        .map_err(|e| eyre!("Refusing to save invalid configuration: {}", e))?;
    let config_file = paths.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let cred_store = load_credentials(&paths)?;

    let secret = |value: Option<&String>| -> String {
        match value {
            Some(v) if full => v.clone(),
            Some(v) => mask_string(v),
            None => "not set".to_string(),
        }
    };
    let api_key = secret(cred_store.get_tmdb_api_key());
    let access_token = secret(cred_store.get_tmdb_access_token());
    let backup_dir = config
        .backup
        .directory
        .clone()
        .unwrap_or_else(|| paths.backup_dir());

    output.data(&json!({
        "config_file": paths.config_file(),
        "database": paths.database_file(),
        "log_dir": paths.log_dir(),
        "tmdb": {
            "base_url": config.tmdb.base_url,
            "image_base_url": config.tmdb.image_base_url,
            "timeout_secs": config.tmdb.timeout_secs,
            "include_adult": config.tmdb.include_adult,
            "api_key": api_key,
            "access_token": access_token,
        },
        "display": config.display,
        "backup": {
            "directory": backup_dir,
            "keep_last": config.backup.keep_last,
        },
        "maintenance": config.maintenance,
    }));
    if !output.is_human() {
        return Ok(());
    }

    if !paths.config_file().exists() {
        output.warn(format!(
            "No config file at {}; showing defaults",
            paths.config_file().display()
        ));
    }

    let mut files = ui::table(&["Files", ""]);
    files.add_row(vec![Cell::new("Config"), Cell::new(paths.config_file().display())]);
    files.add_row(vec![Cell::new("Credentials"), Cell::new(paths.credentials_file().display())]);
    files.add_row(vec![Cell::new("Library"), Cell::new(paths.database_file().display())]);
    files.add_row(vec![Cell::new("Backups"), Cell::new(backup_dir.display())]);
    files.add_row(vec![Cell::new("Logs"), Cell::new(paths.log_dir().display())]);
    println!("{}", files);

    let mut tmdb = ui::table(&["TMDB", ""]);
    tmdb.add_row(vec![Cell::new("Base URL"), Cell::new(&config.tmdb.base_url)]);
    tmdb.add_row(vec![Cell::new("Image URL"), Cell::new(&config.tmdb.image_base_url)]);
    tmdb.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.tmdb.timeout_secs))]);
    tmdb.add_row(vec![
        Cell::new("Include adult"),
        Cell::new(if config.tmdb.include_adult {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        }),
    ]);
    tmdb.add_row(vec![Cell::new("API key"), Cell::new(api_key)]);
    tmdb.add_row(vec![Cell::new("Access token"), Cell::new(access_token)]);
    println!("{}", tmdb);

    let mut other = ui::table(&["Preferences", ""]);
    other.add_row(vec![Cell::new("Theme"), Cell::new(config.display.theme)]);
    other.add_row(vec![Cell::new("Locale"), Cell::new(&config.display.locale)]);
    other.add_row(vec![
        Cell::new("Keep backups"),
        Cell::new(
            config
                .backup
                .keep_last
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
        ),
    ]);
    other.add_row(vec![Cell::new("Maintenance schedule"), Cell::new(&config.maintenance.schedule)]);
    other.add_row(vec![
        Cell::new("Run on startup"),
        Cell::new(if config.maintenance.run_on_startup { "yes" } else { "no" }),
    ]);
    println!("{}", other);

    if std::env::var("TMDB_ACCESS_TOKEN").is_ok() || std::env::var("TMDB_API_KEY").is_ok() {
        output.info("TMDB_ACCESS_TOKEN / TMDB_API_KEY is set and overrides stored credentials.");
    }
    Ok(())
}

fn configure_tmdb(api_key: Option<String>, access_token: Option<String>, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let mut cred_store = load_credentials(&paths)?;

    match (api_key, access_token) {
        (Some(key), _) => {
            let key = key.trim().to_string();
            if key.is_empty() {
                return Err(eyre!("API key must not be empty"));
            }
            cred_store.set_tmdb_api_key(key);
            if cred_store.get_tmdb_access_token().is_some() {
                output.warn("A stored access token takes precedence over the API key.");
            }
        }
        (None, token) => {
            let token = match token {
                Some(token) => token,
                None => prompts::prompt_password("TMDB read access token")?,
            };
            let token = token.trim().to_string();
            if token.is_empty() {
                return Err(eyre!("Access token must not be empty"));
            }
            cred_store.set_tmdb_access_token(token);
        }
    }

    let credentials_file = paths.credentials_file();
    cred_store
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;
    output.success(format!("TMDB credentials saved to {}", credentials_file.display()));
    Ok(())
}

fn configure_display(theme: Option<String>, locale: Option<String>, output: &Output) -> Result<()> {
    if theme.is_none() && locale.is_none() {
        return Err(eyre!("Nothing to change; pass --theme and/or --locale"));
    }

    let paths = PathManager::default();
    let mut config = load_config(&paths)?;

    if let Some(theme) = theme {
        config.display.theme = theme.parse::<Theme>().map_err(|e| eyre!("{}", e))?;
    }
    if let Some(locale) = locale {
        config.display.locale = locale.trim().to_string();
    }

    save_config(&config, &paths)?;
    output.success(format!(
        "Display settings saved (theme: {}, locale: {})",
        config.display.theme, config.display.locale
    ));
    Ok(())
}
