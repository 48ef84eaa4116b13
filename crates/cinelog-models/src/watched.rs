use serde::{Deserialize, Serialize};
use crate::media::{ItemKey, MediaType};

/// A title the user has finished.
///
/// Field names follow the backup document (`camelCase`); missing optional
/// fields deserialize to `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedItem {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    /// Total minutes; for TV this is `episode_runtime * total_episodes`
    pub runtime: Option<i32>,
    pub media_type: MediaType,
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub user_rating: f64,
    pub episode_runtime: Option<i32>,
    pub total_episodes: Option<i32>,
    #[serde(default)]
    pub is_ongoing: bool,
    pub status: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default = "default_watch_count")]
    pub watch_count: i32,
    /// Epoch milliseconds
    pub last_updated: i64,
}

fn default_watch_count() -> i32 {
    1
}

impl WatchedItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id, self.media_type)
    }

    /// True when the stored runtime is missing or zero and needs recomputing.
    pub fn needs_runtime(&self) -> bool {
        self.runtime.map_or(true, |r| r <= 0)
    }
}
