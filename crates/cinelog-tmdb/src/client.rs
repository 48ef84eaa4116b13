use crate::api::{self, ApiContext};
use crate::error::TmdbError;
use crate::traits::MetadataSource;
use crate::types::{
    DiscoverQuery, Genre, MediaPage, MovieDetails, MovieSummary, MultiResult, Page, TimeWindow,
    TvDetails, TvSummary,
};
use async_trait::async_trait;
use cinelog_config::{Config, CredentialStore, TmdbAuth};
use cinelog_models::MediaType;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Connection settings derived from [`Config`] at startup.
#[derive(Debug, Clone)]
pub struct TmdbSettings {
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub include_adult: bool,
    pub timeout: Duration,
}

impl TmdbSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.tmdb.base_url.clone(),
            image_base_url: config.tmdb.image_base_url.clone(),
            language: config.display.locale.clone(),
            include_adult: config.tmdb.include_adult,
            timeout: Duration::from_secs(config.tmdb.timeout_secs),
        }
    }
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Clone)]
pub struct TmdbClient {
    ctx: Arc<ApiContext>,
    image_base_url: String,
}

impl TmdbClient {
    pub fn new(settings: TmdbSettings, auth: TmdbAuth) -> Result<Self, TmdbError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("cinelog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            operation = "tmdb_client_init",
            base_url = %settings.base_url,
            language = %settings.language,
            "TMDB client ready"
        );

        Ok(Self {
            ctx: Arc::new(ApiContext {
                http,
                base_url: settings.base_url,
                auth,
                language: settings.language,
                include_adult: settings.include_adult,
            }),
            image_base_url: settings.image_base_url,
        })
    }

    /// Build a client from stored (or environment) credentials.
    pub fn from_credentials(settings: TmdbSettings, credentials: &CredentialStore) -> Result<Self, TmdbError> {
        let auth = credentials.tmdb_auth().ok_or(TmdbError::MissingCredentials)?;
        Self::new(settings, auth)
    }

    /// Absolute poster/backdrop URL for a TMDB image path such as `/abc.jpg`.
    pub fn image_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    async fn search_multi(&self, query: &str, page: u32) -> Result<Page<MultiResult>, TmdbError> {
        api::search_multi(&self.ctx, query, page).await
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<MovieSummary>, TmdbError> {
        api::search_movies(&self.ctx, query, page).await
    }

    async fn search_tv(&self, query: &str, page: u32) -> Result<Page<TvSummary>, TmdbError> {
        api::search_tv(&self.ctx, query, page).await
    }

    async fn discover(&self, media: MediaType, query: &DiscoverQuery) -> Result<MediaPage, TmdbError> {
        api::discover(&self.ctx, media, query).await
    }

    async fn popular(&self, media: MediaType, page: u32) -> Result<MediaPage, TmdbError> {
        api::popular(&self.ctx, media, page).await
    }

    async fn top_rated(&self, media: MediaType, page: u32) -> Result<MediaPage, TmdbError> {
        api::top_rated(&self.ctx, media, page).await
    }

    async fn trending(
        &self,
        media: Option<MediaType>,
        window: TimeWindow,
        page: u32,
    ) -> Result<Page<MultiResult>, TmdbError> {
        api::trending(&self.ctx, media, window, page).await
    }

    async fn genres(&self, media: MediaType) -> Result<Vec<Genre>, TmdbError> {
        api::genres(&self.ctx, media).await
    }

    async fn movie_details(&self, id: i64) -> Result<MovieDetails, TmdbError> {
        api::movie_details(&self.ctx, id).await
    }

    async fn tv_details(&self, id: i64) -> Result<TvDetails, TmdbError> {
        api::tv_details(&self.ctx, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    fn settings(base_url: String) -> TmdbSettings {
        TmdbSettings {
            base_url,
            language: "de-DE".to_string(),
            ..TmdbSettings::default()
        }
    }

    #[tokio::test]
    async fn test_movie_details_roundtrip() {
        let (base, server) = serve_once("200 OK", r#"{"id": 550, "title": "Fight Club", "runtime": 139}"#).await;
        let client = TmdbClient::new(settings(base), TmdbAuth::AccessToken("tok".to_string())).unwrap();

        let details = client.movie_details(550).await.unwrap();
        assert_eq!(details.id, 550);
        assert_eq!(details.runtime, Some(139));

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /movie/550?language=de-DE&append_to_response=credits%2Cvideos%2Csimilar%2Crecommendations"));
        assert!(request.to_lowercase().contains("authorization: bearer tok"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_typed_error() {
        let (base, server) = serve_once(
            "401 Unauthorized",
            r#"{"status_code": 7, "status_message": "Invalid API key", "success": false}"#,
        )
        .await;
        let client = TmdbClient::new(settings(base), TmdbAuth::ApiKey("bad".to_string())).unwrap();

        let err = client.genres(MediaType::Movie).await.unwrap_err();
        match err {
            TmdbError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /genre/movie/list?api_key=bad&language=de-DE"));
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = TmdbClient::new(settings(format!("http://{}", addr)), TmdbAuth::ApiKey("k".to_string())).unwrap();
        let err = client.popular(MediaType::Tv, 1).await.unwrap_err();
        assert!(matches!(err, TmdbError::Http(_)));
    }

    #[test]
    fn test_image_url() {
        let client = TmdbClient::new(TmdbSettings::default(), TmdbAuth::ApiKey("k".to_string())).unwrap();
        assert_eq!(
            client.image_url("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg"),
            "https://image.tmdb.org/t/p/w500/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let store = CredentialStore::new(std::path::PathBuf::from("/nonexistent/credentials.toml"));
        // Only meaningful when the environment does not provide credentials
        if std::env::var("TMDB_API_KEY").is_err() && std::env::var("TMDB_ACCESS_TOKEN").is_err() {
            let result = TmdbClient::from_credentials(TmdbSettings::default(), &store);
            assert!(matches!(result, Err(TmdbError::MissingCredentials)));
        }
    }
}
