//! Map TMDB detail payloads onto local collection records.

use cinelog_models::{MediaType, PlannedItem, WatchedItem, WatchingItem};
use cinelog_tmdb::{MovieDetails, TvDetails};

use crate::runtime::estimate_runtime;

/// Detail payload for either media kind.
#[derive(Debug, Clone)]
pub enum Details {
    Movie(MovieDetails),
    Tv(TvDetails),
}

/// Fields every collection record shares.
struct Common {
    id: i64,
    title: String,
    poster_path: Option<String>,
    release_date: Option<String>,
    runtime: Option<i32>,
    media_type: MediaType,
}

impl Details {
    pub fn media_type(&self) -> MediaType {
        match self {
            Details::Movie(_) => MediaType::Movie,
            Details::Tv(_) => MediaType::Tv,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Details::Movie(m) => &m.title,
            Details::Tv(t) => &t.name,
        }
    }

    /// Total minutes. For TV this is episodes times the typical episode
    /// length, `None` when either is unknown.
    pub fn runtime(&self) -> Option<i32> {
        match self {
            Details::Movie(m) => m.runtime.filter(|r| *r > 0),
            Details::Tv(t) => {
                let total = estimate_runtime(t.typical_episode_runtime(), t.number_of_episodes.unwrap_or(0));
                (total > 0).then_some(total)
            }
        }
    }

    fn common(&self) -> Common {
        match self {
            Details::Movie(m) => Common {
                id: m.id,
                title: m.title.clone(),
                poster_path: m.poster_path.clone(),
                release_date: m.release_date.clone(),
                runtime: self.runtime(),
                media_type: MediaType::Movie,
            },
            Details::Tv(t) => Common {
                id: t.id,
                title: t.name.clone(),
                poster_path: t.poster_path.clone(),
                release_date: t.first_air_date.clone(),
                runtime: self.runtime(),
                media_type: MediaType::Tv,
            },
        }
    }
}

/// Build a watched record stamped with `now` (epoch ms) and `watch_count = 1`.
pub fn watched_from_details(details: &Details, user_rating: f64, now: i64) -> WatchedItem {
    let common = details.common();
    let (overview, vote_average, status, genre_ids, episode_runtime, total_episodes, is_ongoing) =
        match details {
            Details::Movie(m) => (
                m.overview.clone(),
                m.vote_average,
                m.status.clone(),
                m.genres.iter().map(|g| g.id).collect::<Vec<_>>(),
                None,
                None,
                false,
            ),
            Details::Tv(t) => (
                t.overview.clone(),
                t.vote_average,
                t.status.clone(),
                t.genres.iter().map(|g| g.id).collect::<Vec<_>>(),
                t.typical_episode_runtime(),
                t.number_of_episodes,
                t.in_production,
            ),
        };

    WatchedItem {
        id: common.id,
        title: common.title,
        poster_path: common.poster_path,
        release_date: common.release_date,
        runtime: common.runtime,
        media_type: common.media_type,
        overview,
        vote_average,
        user_rating,
        episode_runtime,
        total_episodes,
        is_ongoing,
        status,
        genre_ids,
        watch_count: 1,
        last_updated: now,
    }
}

pub fn planned_from_details(details: &Details, now: i64) -> PlannedItem {
    let common = details.common();
    PlannedItem {
        id: common.id,
        title: common.title,
        poster_path: common.poster_path,
        release_date: common.release_date,
        runtime: common.runtime,
        media_type: common.media_type,
        date_added: now,
    }
}

/// Starts TV shows at S1E1; movies carry no episode pointer.
pub fn watching_from_details(details: &Details, now: i64) -> WatchingItem {
    let common = details.common();
    let (current_season, current_episode) = match common.media_type {
        MediaType::Tv => (Some(1), Some(1)),
        MediaType::Movie => (None, None),
    };
    WatchingItem {
        id: common.id,
        title: common.title,
        poster_path: common.poster_path,
        release_date: common.release_date,
        runtime: common.runtime,
        media_type: common.media_type,
        date_added: now,
        current_episode,
        current_season,
    }
}
