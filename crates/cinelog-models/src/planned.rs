use serde::{Deserialize, Serialize};
use crate::media::{ItemKey, MediaType};

/// A wish-listed title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub media_type: MediaType,
    pub date_added: i64, // epoch ms
}

impl PlannedItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id, self.media_type)
    }
}
