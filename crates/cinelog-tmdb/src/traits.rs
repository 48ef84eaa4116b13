use async_trait::async_trait;
use cinelog_models::MediaType;
use crate::error::TmdbError;
use crate::types::{
    DiscoverQuery, Genre, MediaPage, MovieDetails, MovieSummary, MultiResult, Page, TimeWindow,
    TvDetails, TvSummary,
};

/// Read-only movie/TV metadata provider.
///
/// The repository only talks to remote metadata through this trait, so tests
/// and alternative providers can stand in for [`crate::TmdbClient`].
#[async_trait]
pub trait MetadataSource: Send + Sync {
    // Search
    async fn search_multi(&self, query: &str, page: u32) -> Result<Page<MultiResult>, TmdbError>;
    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<MovieSummary>, TmdbError>;
    async fn search_tv(&self, query: &str, page: u32) -> Result<Page<TvSummary>, TmdbError>;

    // Browse
    async fn discover(&self, media: MediaType, query: &DiscoverQuery) -> Result<MediaPage, TmdbError>;
    async fn popular(&self, media: MediaType, page: u32) -> Result<MediaPage, TmdbError>;
    async fn top_rated(&self, media: MediaType, page: u32) -> Result<MediaPage, TmdbError>;
    async fn trending(
        &self,
        media: Option<MediaType>,
        window: TimeWindow,
        page: u32,
    ) -> Result<Page<MultiResult>, TmdbError>;
    async fn genres(&self, media: MediaType) -> Result<Vec<Genre>, TmdbError>;

    // Details
    async fn movie_details(&self, id: i64) -> Result<MovieDetails, TmdbError>;
    async fn tv_details(&self, id: i64) -> Result<TvDetails, TmdbError>;
}
