use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const TMDB_API_KEY: &str = "tmdb_api_key";
const TMDB_ACCESS_TOKEN: &str = "tmdb_access_token";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// How requests to TMDB are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum TmdbAuth {
    /// v3 key sent as the `api_key` query parameter
    ApiKey(String),
    /// v4 read-access token sent as a bearer header
    AccessToken(String),
}

impl std::fmt::Debug for TmdbAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TmdbAuth::ApiKey(_) => f.write_str("ApiKey(***)"),
            TmdbAuth::AccessToken(_) => f.write_str("AccessToken(***)"),
        }
    }
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_tmdb_api_key(&self) -> Option<&String> {
        self.get(TMDB_API_KEY)
    }

    pub fn set_tmdb_api_key(&mut self, key: String) {
        self.set(TMDB_API_KEY.to_string(), key);
    }

    pub fn get_tmdb_access_token(&self) -> Option<&String> {
        self.get(TMDB_ACCESS_TOKEN)
    }

    pub fn set_tmdb_access_token(&mut self, token: String) {
        self.set(TMDB_ACCESS_TOKEN.to_string(), token);
    }

    /// Resolve TMDB credentials, letting `TMDB_ACCESS_TOKEN` / `TMDB_API_KEY`
    /// override the stored values.
    pub fn tmdb_auth(&self) -> Option<TmdbAuth> {
        self.tmdb_auth_with(
            std::env::var("TMDB_ACCESS_TOKEN").ok(),
            std::env::var("TMDB_API_KEY").ok(),
        )
    }

    /// Access tokens win over API keys, environment wins over file.
    pub fn tmdb_auth_with(&self, env_token: Option<String>, env_key: Option<String>) -> Option<TmdbAuth> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        non_empty(env_token)
            .map(TmdbAuth::AccessToken)
            .or_else(|| non_empty(env_key).map(TmdbAuth::ApiKey))
            .or_else(|| non_empty(self.get_tmdb_access_token().cloned()).map(TmdbAuth::AccessToken))
            .or_else(|| non_empty(self.get_tmdb_api_key().cloned()).map(TmdbAuth::ApiKey))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_tmdb_api_key("test_key".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_tmdb_api_key(), Some(&"test_key".to_string()));
        assert_eq!(loaded_store.get_tmdb_access_token(), None);
    }

    #[test]
    fn test_tmdb_auth_precedence() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        assert_eq!(store.tmdb_auth_with(None, None), None);

        store.set_tmdb_api_key("file_key".to_string());
        assert_eq!(store.tmdb_auth_with(None, None), Some(TmdbAuth::ApiKey("file_key".to_string())));

        store.set_tmdb_access_token("file_token".to_string());
        assert_eq!(
            store.tmdb_auth_with(None, None),
            Some(TmdbAuth::AccessToken("file_token".to_string()))
        );

        assert_eq!(
            store.tmdb_auth_with(None, Some("env_key".to_string())),
            Some(TmdbAuth::ApiKey("env_key".to_string()))
        );
        assert_eq!(
            store.tmdb_auth_with(Some("  ".to_string()), None),
            Some(TmdbAuth::AccessToken("file_token".to_string()))
        );
    }

    #[test]
    fn test_credential_store_remove() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set("key1".to_string(), "value1".to_string());
        store.set("key2".to_string(), "value2".to_string());

        assert_eq!(store.get("key1"), Some(&"value1".to_string()));
        store.remove("key1");
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.get("key2"), Some(&"value2".to_string()));
    }

    #[test]
    fn test_auth_debug_masks_secret() {
        let auth = TmdbAuth::ApiKey("secret".to_string());
        assert_eq!(format!("{:?}", auth), "ApiKey(***)");
    }
}
