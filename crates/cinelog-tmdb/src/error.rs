use thiserror::Error;

/// Failures from the TMDB client.
#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TMDB API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Parse(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("no TMDB credentials configured (set TMDB_API_KEY or run `cinelog config tmdb`)")]
    MissingCredentials,
}

impl TmdbError {
    /// True for 404s, which callers usually report as "not found" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TmdbError::Api { status: 404, .. })
    }
}
