//! One function per TMDB endpoint.
//!
//! Each function builds its request, dispatches it, maps non-2xx statuses to
//! [`TmdbError::Api`] and validates the body by deserializing it into a
//! typed response.

use crate::error::TmdbError;
use crate::types::{
    DiscoverQuery, ErrorBody, Genre, GenreList, MediaPage, MovieDetails, MovieSummary,
    MultiResult, Page, TimeWindow, TvDetails, TvSummary,
};
use cinelog_config::TmdbAuth;
use cinelog_models::MediaType;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const DETAIL_APPENDS: &str = "credits,videos,similar,recommendations";

/// Everything a request needs besides its own parameters.
pub struct ApiContext {
    pub http: Client,
    pub base_url: String,
    pub auth: TmdbAuth,
    pub language: String,
    pub include_adult: bool,
}

/// Build the full request URL: base + path, auth key (v3 only), language, then `params`.
pub fn request_url(ctx: &ApiContext, path: &str, params: &[(&str, String)]) -> Result<Url, TmdbError> {
    let base = ctx.base_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{}{}", base, path))
        .map_err(|e| TmdbError::InvalidUrl(format!("{}{}: {}", base, path, e)))?;

    {
        let mut pairs = url.query_pairs_mut();
        if let TmdbAuth::ApiKey(key) = &ctx.auth {
            pairs.append_pair("api_key", key);
        }
        pairs.append_pair("language", &ctx.language);
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Convert a non-2xx response into an error, preferring TMDB's own message.
pub(crate) fn api_error(status: u16, body: &str) -> TmdbError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.status_message)
        .unwrap_or_else(|| body.trim().to_string());
    TmdbError::Api { status, message }
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, TmdbError> {
    serde_json::from_str(body).map_err(|e| TmdbError::Parse(format!("{}: {}", what, e)))
}

async fn get_json<T: DeserializeOwned>(
    ctx: &ApiContext,
    path: &str,
    params: &[(&str, String)],
) -> Result<T, TmdbError> {
    let url = request_url(ctx, path, params)?;
    debug!(operation = "tmdb_request", path, "GET {}", path);

    let mut request = ctx.http.get(url).header("Accept", "application/json");
    if let TmdbAuth::AccessToken(token) = &ctx.auth {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let err = api_error(status.as_u16(), &body);
        warn!(operation = "tmdb_request", path, status = status.as_u16(), "TMDB request failed: {}", err);
        return Err(err);
    }

    parse_body(&body, path)
}

fn page_param(page: u32) -> (&'static str, String) {
    ("page", page.max(1).to_string())
}

fn empty_page<T>() -> Page<T> {
    Page {
        page: 1,
        results: Vec::new(),
        total_pages: 0,
        total_results: 0,
    }
}

fn search_params(ctx: &ApiContext, query: &str, page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("query", query.trim().to_string()),
        page_param(page),
        ("include_adult", ctx.include_adult.to_string()),
    ]
}

/// `GET /search/multi`. A blank query short-circuits to an empty page.
pub async fn search_multi(ctx: &ApiContext, query: &str, page: u32) -> Result<Page<MultiResult>, TmdbError> {
    if query.trim().is_empty() {
        return Ok(empty_page());
    }
    get_json(ctx, "/search/multi", &search_params(ctx, query, page)).await
}

/// `GET /search/movie`
pub async fn search_movies(ctx: &ApiContext, query: &str, page: u32) -> Result<Page<MovieSummary>, TmdbError> {
    if query.trim().is_empty() {
        return Ok(empty_page());
    }
    get_json(ctx, "/search/movie", &search_params(ctx, query, page)).await
}

/// `GET /search/tv`
pub async fn search_tv(ctx: &ApiContext, query: &str, page: u32) -> Result<Page<TvSummary>, TmdbError> {
    if query.trim().is_empty() {
        return Ok(empty_page());
    }
    get_json(ctx, "/search/tv", &search_params(ctx, query, page)).await
}

pub(crate) fn discover_params(ctx: &ApiContext, media: MediaType, query: &DiscoverQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        page_param(query.page),
        ("include_adult", ctx.include_adult.to_string()),
        (
            "sort_by",
            query.sort_by.clone().unwrap_or_else(|| "popularity.desc".to_string()),
        ),
    ];
    if let Some(genre) = query.genre {
        params.push(("with_genres", genre.to_string()));
    }
    if let Some(year) = query.year {
        let key = match media {
            MediaType::Movie => "primary_release_year",
            MediaType::Tv => "first_air_date_year",
        };
        params.push((key, year.to_string()));
    }
    params
}

/// `GET /discover/{movie,tv}`
pub async fn discover(ctx: &ApiContext, media: MediaType, query: &DiscoverQuery) -> Result<MediaPage, TmdbError> {
    let params = discover_params(ctx, media, query);
    match media {
        MediaType::Movie => Ok(MediaPage::Movies(get_json(ctx, "/discover/movie", &params).await?)),
        MediaType::Tv => Ok(MediaPage::Tv(get_json(ctx, "/discover/tv", &params).await?)),
    }
}

/// `GET /movie/{id}` with credits, videos, similar and recommendations.
pub async fn movie_details(ctx: &ApiContext, id: i64) -> Result<MovieDetails, TmdbError> {
    let path = format!("/movie/{}", id);
    get_json(ctx, &path, &[("append_to_response", DETAIL_APPENDS.to_string())]).await
}

/// `GET /tv/{id}` with credits, videos, similar and recommendations.
pub async fn tv_details(ctx: &ApiContext, id: i64) -> Result<TvDetails, TmdbError> {
    let path = format!("/tv/{}", id);
    get_json(ctx, &path, &[("append_to_response", DETAIL_APPENDS.to_string())]).await
}

async fn media_listing(ctx: &ApiContext, media: MediaType, list: &str, page: u32) -> Result<MediaPage, TmdbError> {
    let path = format!("/{}/{}", media.as_str(), list);
    let params = [page_param(page)];
    match media {
        MediaType::Movie => Ok(MediaPage::Movies(get_json(ctx, &path, &params).await?)),
        MediaType::Tv => Ok(MediaPage::Tv(get_json(ctx, &path, &params).await?)),
    }
}

/// `GET /{movie,tv}/popular`
pub async fn popular(ctx: &ApiContext, media: MediaType, page: u32) -> Result<MediaPage, TmdbError> {
    media_listing(ctx, media, "popular", page).await
}

/// `GET /{movie,tv}/top_rated`
pub async fn top_rated(ctx: &ApiContext, media: MediaType, page: u32) -> Result<MediaPage, TmdbError> {
    media_listing(ctx, media, "top_rated", page).await
}

pub(crate) fn trending_path(media: Option<MediaType>, window: TimeWindow) -> String {
    let target = media.map(|m| m.as_str()).unwrap_or("all");
    format!("/trending/{}/{}", target, window.as_str())
}

/// `GET /trending/{movie,tv,all}/{day,week}`. `None` means all media types.
pub async fn trending(
    ctx: &ApiContext,
    media: Option<MediaType>,
    window: TimeWindow,
    page: u32,
) -> Result<Page<MultiResult>, TmdbError> {
    get_json(ctx, &trending_path(media, window), &[page_param(page)]).await
}

/// `GET /genre/{movie,tv}/list`
pub async fn genres(ctx: &ApiContext, media: MediaType) -> Result<Vec<Genre>, TmdbError> {
    let path = format!("/genre/{}/list", media.as_str());
    let list: GenreList = get_json(ctx, &path, &[]).await?;
    Ok(list.genres)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(auth: TmdbAuth) -> ApiContext {
        ApiContext {
            http: Client::new(),
            base_url: "https://api.themoviedb.org/3/".to_string(),
            auth,
            language: "en-US".to_string(),
            include_adult: false,
        }
    }

    #[test]
    fn test_request_url_with_api_key() {
        let ctx = context(TmdbAuth::ApiKey("k3y".to_string()));
        let url = request_url(&ctx, "/search/movie", &[("query", "fight club".to_string())]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.themoviedb.org/3/search/movie?api_key=k3y&language=en-US&query=fight+club"
        );
    }

    #[test]
    fn test_request_url_with_access_token_has_no_key() {
        let ctx = context(TmdbAuth::AccessToken("token".to_string()));
        let url = request_url(&ctx, "/movie/550", &[]).unwrap();
        assert!(!url.as_str().contains("api_key"));
        assert!(url.as_str().ends_with("/3/movie/550?language=en-US"));
    }

    #[test]
    fn test_api_error_prefers_status_message() {
        let err = api_error(401, r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#);
        match err {
            TmdbError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.starts_with("Invalid API key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = api_error(502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "TMDB API error (status 502): Bad Gateway");
        assert!(api_error(404, "").is_not_found());
    }

    #[test]
    fn test_parse_body_rejects_wrong_shape() {
        let result: Result<MovieDetails, _> = parse_body(r#"{"page": 1}"#, "/movie/1");
        assert!(matches!(result, Err(TmdbError::Parse(_))));
    }

    #[test]
    fn test_discover_params() {
        let ctx = context(TmdbAuth::ApiKey("k".to_string()));
        let query = DiscoverQuery {
            genre: Some(18),
            sort_by: None,
            year: Some(2011),
            page: 0,
        };
        let params = discover_params(&ctx, MediaType::Tv, &query);
        assert!(params.contains(&("page", "1".to_string())));
        assert!(params.contains(&("with_genres", "18".to_string())));
        assert!(params.contains(&("first_air_date_year", "2011".to_string())));
        assert!(params.contains(&("sort_by", "popularity.desc".to_string())));

        let params = discover_params(&ctx, MediaType::Movie, &query);
        assert!(params.contains(&("primary_release_year", "2011".to_string())));
    }

    #[test]
    fn test_trending_path() {
        assert_eq!(trending_path(None, TimeWindow::Day), "/trending/all/day");
        assert_eq!(trending_path(Some(MediaType::Tv), TimeWindow::Week), "/trending/tv/week");
    }

    #[tokio::test]
    async fn test_blank_search_skips_request() {
        // Unroutable base URL: any request would fail
        let mut ctx = context(TmdbAuth::ApiKey("k".to_string()));
        ctx.base_url = "http://127.0.0.1:9".to_string();
        let page = search_multi(&ctx, "   ", 1).await.unwrap();
        assert!(page.results.is_empty());
    }
}
