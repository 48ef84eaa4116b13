use cinelog_models::MediaType;
use serde::{Deserialize, Serialize};

/// One page of a paginated TMDB listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
}

/// Entry of `/search/multi` and `/trending/*`, discriminated by `media_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum MultiResult {
    Movie(MovieSummary),
    Tv(TvSummary),
    Person(PersonSummary),
}

impl MultiResult {
    pub fn id(&self) -> i64 {
        match self {
            MultiResult::Movie(m) => m.id,
            MultiResult::Tv(t) => t.id,
            MultiResult::Person(p) => p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MultiResult::Movie(m) => &m.title,
            MultiResult::Tv(t) => &t.name,
            MultiResult::Person(p) => &p.name,
        }
    }

    /// `None` for people, who cannot be tracked.
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            MultiResult::Movie(_) => Some(MediaType::Movie),
            MultiResult::Tv(_) => Some(MediaType::Tv),
            MultiResult::Person(_) => None,
        }
    }
}

/// Listing whose element type depends on the requested media type.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MediaPage {
    Movies(Page<MovieSummary>),
    Tv(Page<TvSummary>),
}

impl MediaPage {
    pub fn len(&self) -> usize {
        match self {
            MediaPage::Movies(p) => p.results.len(),
            MediaPage::Tv(p) => p.results.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(id, title, date, vote)` rows, for uniform display.
    pub fn rows(&self) -> Vec<(i64, String, Option<String>, f64)> {
        match self {
            MediaPage::Movies(p) => p
                .results
                .iter()
                .map(|m| (m.id, m.title.clone(), m.release_date.clone(), m.vote_average))
                .collect(),
            MediaPage::Tv(p) => p
                .results
                .iter()
                .map(|t| (t.id, t.name.clone(), t.first_air_date.clone(), t.vote_average))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct GenreList {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

impl VideoList {
    /// First YouTube trailer, if any.
    pub fn trailer(&self) -> Option<&Video> {
        self.results
            .iter()
            .find(|v| v.site == "YouTube" && v.video_type == "Trailer")
    }
}

/// `/movie/{id}` with credits, videos, similar and recommendations appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<VideoList>,
    #[serde(default)]
    pub similar: Option<Page<MovieSummary>>,
    #[serde(default)]
    pub recommendations: Option<Page<MovieSummary>>,
}

/// `/tv/{id}` with credits, videos, similar and recommendations appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvDetails {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub episode_run_time: Vec<i32>,
    #[serde(default)]
    pub number_of_episodes: Option<i32>,
    #[serde(default)]
    pub number_of_seasons: Option<i32>,
    #[serde(default)]
    pub in_production: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<VideoList>,
    #[serde(default)]
    pub similar: Option<Page<TvSummary>>,
    #[serde(default)]
    pub recommendations: Option<Page<TvSummary>>,
}

impl TvDetails {
    /// TMDB lists several runtimes for some shows; the first one is the typical length.
    pub fn typical_episode_runtime(&self) -> Option<i32> {
        self.episode_run_time.iter().copied().find(|m| *m > 0)
    }
}

/// Body TMDB returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub status_message: Option<String>,
}

/// Filters for `/discover/{movie,tv}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverQuery {
    pub genre: Option<i64>,
    /// e.g. `popularity.desc`, `vote_average.desc`
    pub sort_by: Option<String>,
    pub year: Option<i32>,
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}
