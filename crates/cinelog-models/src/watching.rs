use serde::{Deserialize, Serialize};
use crate::media::{ItemKey, MediaType};

/// A title in progress, with the user's current position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchingItem {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub media_type: MediaType,
    pub date_added: i64, // epoch ms
    pub current_episode: Option<i32>,
    pub current_season: Option<i32>,
}

impl WatchingItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id, self.media_type)
    }
}
