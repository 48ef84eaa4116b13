pub mod api;
pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::{TmdbClient, TmdbSettings};
pub use error::TmdbError;
pub use traits::MetadataSource;
pub use types::{
    CastMember, Credits, CrewMember, DiscoverQuery, Genre, MediaPage, MovieDetails, MovieSummary,
    MultiResult, Page, PersonSummary, TimeWindow, TvDetails, TvSummary, Video, VideoList,
};
