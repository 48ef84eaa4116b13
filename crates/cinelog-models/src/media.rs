use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminates movies from TV shows.
///
/// TMDB reuses numeric ids across the two catalogues, so the media type is
/// part of every record's identity. Serialized with the TMDB wire spelling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    pub fn is_tv(&self) -> bool {
        matches!(self, MediaType::Tv)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMediaTypeError(String);

impl fmt::Display for ParseMediaTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown media type '{}', expected 'movie' or 'tv'", self.0)
    }
}

impl std::error::Error for ParseMediaTypeError {}

impl FromStr for MediaType {
    type Err = ParseMediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaType::Movie),
            "tv" | "show" | "shows" => Ok(MediaType::Tv),
            other => Err(ParseMediaTypeError(other.to_string())),
        }
    }
}

/// Composite identity of a tracked title: `(TMDB id, media type)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub id: i64,
    pub media_type: MediaType,
}

impl ItemKey {
    pub fn new(id: i64, media_type: MediaType) -> Self {
        Self { id, media_type }
    }

    pub fn movie(id: i64) -> Self {
        Self::new(id, MediaType::Movie)
    }

    pub fn tv(id: i64) -> Self {
        Self::new(id, MediaType::Tv)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.media_type, self.id)
    }
}

/// Which personal list a title currently lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Finished
    Watched,
    /// Wish-listed
    Planned,
    /// In progress
    Watching,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Watched => "watched",
            Collection::Planned => "planned",
            Collection::Watching => "watching",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current wall-clock time as epoch milliseconds, the timestamp unit used by
/// every stored record.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
