//! Single entry point for the local collections and remote TMDB metadata.
//!
//! Local operations are synchronous and durable once they return. Remote
//! operations are one-shot async pass-throughs to the [`MetadataSource`];
//! nothing is retried or cached here.

use cinelog_models::{Collection, ItemKey, MediaType, PlannedItem, WatchedItem, WatchingItem};
use cinelog_tmdb::{
    DiscoverQuery, Genre, MediaPage, MetadataSource, MovieDetails, MovieSummary, MultiResult, Page,
    TimeWindow, TvDetails, TvSummary,
};
use tracing::{debug, info};

use crate::convert::Details;
use crate::error::{RepositoryError, StoreError};
use crate::store::{LibraryStats, SqliteStore};

pub struct Repository<S> {
    store: SqliteStore,
    remote: Option<S>,
}

impl<S: MetadataSource> Repository<S> {
    pub fn new(store: SqliteStore, remote: S) -> Self {
        Self {
            store,
            remote: Some(remote),
        }
    }

    /// Repository without remote access; remote operations fail with
    /// [`RepositoryError::RemoteUnavailable`].
    pub fn local(store: SqliteStore) -> Self {
        Self { store, remote: None }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// The underlying metadata source, if any.
    pub fn source(&self) -> Option<&S> {
        self.remote.as_ref()
    }

    fn remote(&self) -> Result<&S, RepositoryError> {
        self.remote.as_ref().ok_or(RepositoryError::RemoteUnavailable)
    }

    // ── Backup snapshots ────────────────────────────────────────

    pub fn get_watched_items_for_backup(&self) -> Result<Vec<WatchedItem>, StoreError> {
        self.store.all_watched()
    }

    pub fn get_planned_items_for_backup(&self) -> Result<Vec<PlannedItem>, StoreError> {
        self.store.all_planned()
    }

    pub fn get_watching_items_for_backup(&self) -> Result<Vec<WatchingItem>, StoreError> {
        self.store.all_watching()
    }

    // ── Writes ──────────────────────────────────────────────────

    /// Insert, or replace the row with the same `(id, media_type)`.
    pub fn add_watched_item(&self, item: &WatchedItem) -> Result<(), StoreError> {
        debug!(operation = "add_watched", key = %item.key(), "Upserting watched item");
        self.store.upsert_watched(item)
    }

    pub fn add_planned_item(&self, item: &PlannedItem) -> Result<(), StoreError> {
        debug!(operation = "add_planned", key = %item.key(), "Upserting planned item");
        self.store.upsert_planned(item)
    }

    pub fn add_watching_item(&self, item: &WatchingItem) -> Result<(), StoreError> {
        debug!(operation = "add_watching", key = %item.key(), "Upserting watching item");
        self.store.upsert_watching(item)
    }

    /// Returns `false` if nothing matched.
    pub fn remove_watched_item(&self, id: i64, media_type: MediaType) -> Result<bool, StoreError> {
        self.store.delete_watched(ItemKey::new(id, media_type))
    }

    pub fn remove_planned_item(&self, id: i64, media_type: MediaType) -> Result<bool, StoreError> {
        self.store.delete_planned(ItemKey::new(id, media_type))
    }

    pub fn remove_watching_item(&self, id: i64, media_type: MediaType) -> Result<bool, StoreError> {
        self.store.delete_watching(ItemKey::new(id, media_type))
    }

    pub fn delete_all_watched(&self) -> Result<usize, StoreError> {
        self.store.clear_watched()
    }

    pub fn delete_all_planned(&self) -> Result<usize, StoreError> {
        self.store.clear_planned()
    }

    pub fn delete_all_watching(&self) -> Result<usize, StoreError> {
        self.store.clear_watching()
    }

    /// Wipe every collection and load the given rows in one transaction.
    pub fn replace_all(
        &self,
        watched: &[WatchedItem],
        planned: &[PlannedItem],
        watching: &[WatchingItem],
    ) -> Result<(), StoreError> {
        self.store.replace_all(watched, planned, watching)?;
        info!(
            operation = "replace_all",
            watched = watched.len(),
            planned = planned.len(),
            watching = watching.len(),
            "Replaced library contents"
        );
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────

    pub fn get_watched_item(&self, key: ItemKey) -> Result<Option<WatchedItem>, StoreError> {
        self.store.get_watched(key)
    }

    pub fn get_planned_item(&self, key: ItemKey) -> Result<Option<PlannedItem>, StoreError> {
        self.store.get_planned(key)
    }

    pub fn get_watching_item(&self, key: ItemKey) -> Result<Option<WatchingItem>, StoreError> {
        self.store.get_watching(key)
    }

    /// Most recently updated first.
    pub fn list_watched(&self) -> Result<Vec<WatchedItem>, StoreError> {
        self.store.recent_watched()
    }

    /// Most recently added first.
    pub fn list_planned(&self) -> Result<Vec<PlannedItem>, StoreError> {
        self.store.recent_planned()
    }

    /// Most recently added first.
    pub fn list_watching(&self) -> Result<Vec<WatchingItem>, StoreError> {
        self.store.recent_watching()
    }

    pub fn watched_shows(&self) -> Result<Vec<WatchedItem>, StoreError> {
        self.store.watched_by_media(MediaType::Tv)
    }

    pub fn locate(&self, key: ItemKey) -> Result<Option<Collection>, StoreError> {
        self.store.locate(key)
    }

    pub fn stats(&self) -> Result<LibraryStats, StoreError> {
        self.store.stats()
    }

    // ── Moves ───────────────────────────────────────────────────

    /// Record a watch. Re-watching bumps `watch_count`; the title leaves
    /// planned and watching.
    pub fn mark_watched(&self, item: &WatchedItem) -> Result<WatchedItem, StoreError> {
        let stored = self.store.mark_watched(item)?;
        info!(
            operation = "mark_watched",
            key = %stored.key(),
            watch_count = stored.watch_count,
            "Marked as watched"
        );
        Ok(stored)
    }

    /// Put a title in progress, taking it off the planned list.
    pub fn start_watching(&self, item: &WatchingItem) -> Result<(), StoreError> {
        self.store.start_watching(item)?;
        info!(operation = "start_watching", key = %item.key(), "Started watching");
        Ok(())
    }

    /// Move the in-progress pointer. `Ok(false)` when the title is not being watched.
    pub fn advance_episode(&self, key: ItemKey, season: i32, episode: i32) -> Result<bool, StoreError> {
        let updated = self
            .store
            .update_watching_progress(key, Some(season), Some(episode))?;
        debug!(operation = "advance_episode", key = %key, season, episode, updated, "Progress update");
        Ok(updated)
    }

    // ── Remote ──────────────────────────────────────────────────

    pub async fn search_multi(&self, query: &str, page: u32) -> Result<Page<MultiResult>, RepositoryError> {
        Ok(self.remote()?.search_multi(query, page).await?)
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Page<MovieSummary>, RepositoryError> {
        Ok(self.remote()?.search_movies(query, page).await?)
    }

    pub async fn search_tv(&self, query: &str, page: u32) -> Result<Page<TvSummary>, RepositoryError> {
        Ok(self.remote()?.search_tv(query, page).await?)
    }

    pub async fn discover(&self, media: MediaType, query: &DiscoverQuery) -> Result<MediaPage, RepositoryError> {
        Ok(self.remote()?.discover(media, query).await?)
    }

    pub async fn movie_details(&self, id: i64) -> Result<MovieDetails, RepositoryError> {
        Ok(self.remote()?.movie_details(id).await?)
    }

    pub async fn tv_details(&self, id: i64) -> Result<TvDetails, RepositoryError> {
        Ok(self.remote()?.tv_details(id).await?)
    }

    /// Movie or TV details depending on `media`.
    pub async fn details(&self, key: ItemKey) -> Result<Details, RepositoryError> {
        match key.media_type {
            MediaType::Movie => Ok(Details::Movie(self.movie_details(key.id).await?)),
            MediaType::Tv => Ok(Details::Tv(self.tv_details(key.id).await?)),
        }
    }

    pub async fn popular(&self, media: MediaType, page: u32) -> Result<MediaPage, RepositoryError> {
        Ok(self.remote()?.popular(media, page).await?)
    }

    pub async fn top_rated(&self, media: MediaType, page: u32) -> Result<MediaPage, RepositoryError> {
        Ok(self.remote()?.top_rated(media, page).await?)
    }

    pub async fn trending(
        &self,
        media: Option<MediaType>,
        window: TimeWindow,
        page: u32,
    ) -> Result<Page<MultiResult>, RepositoryError> {
        Ok(self.remote()?.trending(media, window, page).await?)
    }

    pub async fn genres(&self, media: MediaType) -> Result<Vec<Genre>, RepositoryError> {
        Ok(self.remote()?.genres(media).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cinelog_tmdb::TmdbError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned details and counts calls.
    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn empty<T>() -> Page<T> {
        Page {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    #[async_trait]
    impl MetadataSource for FakeSource {
        async fn search_multi(&self, _query: &str, _page: u32) -> Result<Page<MultiResult>, TmdbError> {
            self.hit();
            Ok(empty())
        }
        async fn search_movies(&self, _query: &str, _page: u32) -> Result<Page<MovieSummary>, TmdbError> {
            self.hit();
            Ok(empty())
        }
        async fn search_tv(&self, _query: &str, _page: u32) -> Result<Page<TvSummary>, TmdbError> {
            self.hit();
            Ok(empty())
        }
        async fn discover(&self, _media: MediaType, _query: &DiscoverQuery) -> Result<MediaPage, TmdbError> {
            self.hit();
            Ok(MediaPage::Movies(empty()))
        }
        async fn popular(&self, _media: MediaType, _page: u32) -> Result<MediaPage, TmdbError> {
            self.hit();
            Ok(MediaPage::Tv(empty()))
        }
        async fn top_rated(&self, _media: MediaType, _page: u32) -> Result<MediaPage, TmdbError> {
            self.hit();
            Ok(MediaPage::Movies(empty()))
        }
        async fn trending(
            &self,
            _media: Option<MediaType>,
            _window: TimeWindow,
            _page: u32,
        ) -> Result<Page<MultiResult>, TmdbError> {
            self.hit();
            Ok(empty())
        }
        async fn genres(&self, _media: MediaType) -> Result<Vec<Genre>, TmdbError> {
            self.hit();
            Ok(vec![Genre {
                id: 18,
                name: "Drama".to_string(),
            }])
        }
        async fn movie_details(&self, id: i64) -> Result<MovieDetails, TmdbError> {
            self.hit();
            if id != 550 {
                return Err(TmdbError::Api {
                    status: 404,
                    message: "The resource you requested could not be found.".to_string(),
                });
            }
            Ok(serde_json::from_str(r#"{"id": 550, "title": "Fight Club", "runtime": 139}"#).unwrap())
        }
        async fn tv_details(&self, id: i64) -> Result<TvDetails, TmdbError> {
            self.hit();
            Ok(serde_json::from_str(&format!(
                r#"{{"id": {}, "name": "Show {}", "episode_run_time": [30], "number_of_episodes": 10}}"#,
                id, id
            ))
            .unwrap())
        }
    }

    fn repo() -> Repository<FakeSource> {
        Repository::new(SqliteStore::open_memory().unwrap(), FakeSource::default())
    }

    fn planned(id: i64, media_type: MediaType) -> PlannedItem {
        PlannedItem {
            id,
            title: format!("Title {}", id),
            poster_path: None,
            release_date: None,
            runtime: None,
            media_type,
            date_added: 1,
        }
    }

    #[test]
    fn test_remove_uses_composite_identity() {
        let repo = repo();
        repo.add_planned_item(&planned(1399, MediaType::Movie)).unwrap();
        repo.add_planned_item(&planned(1399, MediaType::Tv)).unwrap();

        assert!(repo.remove_planned_item(1399, MediaType::Tv).unwrap());
        assert!(!repo.remove_planned_item(1399, MediaType::Tv).unwrap());

        let left = repo.get_planned_items_for_backup().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].media_type, MediaType::Movie);
    }

    #[test]
    fn test_delete_all_reports_counts() {
        let repo = repo();
        repo.add_planned_item(&planned(1, MediaType::Movie)).unwrap();
        repo.add_planned_item(&planned(2, MediaType::Movie)).unwrap();
        assert_eq!(repo.delete_all_planned().unwrap(), 2);
        assert_eq!(repo.delete_all_watched().unwrap(), 0);
        assert_eq!(repo.delete_all_watching().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_watch_flow_through_details() {
        let repo = repo();
        let details = repo.details(ItemKey::tv(1399)).await.unwrap();

        let watching = crate::convert::watching_from_details(&details, 10);
        repo.add_planned_item(&planned(1399, MediaType::Tv)).unwrap();
        repo.start_watching(&watching).unwrap();
        assert_eq!(repo.locate(ItemKey::tv(1399)).unwrap(), Some(Collection::Watching));

        assert!(repo.advance_episode(ItemKey::tv(1399), 1, 4).unwrap());
        assert!(!repo.advance_episode(ItemKey::movie(1399), 1, 4).unwrap());

        let watched = crate::convert::watched_from_details(&details, 0.0, 20);
        assert_eq!(watched.runtime, Some(300));
        repo.mark_watched(&watched).unwrap();
        assert_eq!(repo.locate(ItemKey::tv(1399)).unwrap(), Some(Collection::Watched));
        assert!(repo.list_watching().unwrap().is_empty());

        let stats = repo.stats().unwrap();
        assert_eq!(stats.watched, 1);
        assert_eq!(stats.total_minutes, 300);
    }

    #[tokio::test]
    async fn test_remote_errors_surface() {
        let repo = repo();
        let err = repo.movie_details(1).await.unwrap_err();
        match err {
            RepositoryError::Remote(e) => assert!(e.is_not_found()),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(repo.genres(MediaType::Movie).await.unwrap().len(), 1);
        assert_eq!(repo.remote.as_ref().unwrap().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_local_repository_has_no_remote() {
        let repo: Repository<FakeSource> = Repository::local(SqliteStore::open_memory().unwrap());
        assert!(!repo.has_remote());
        assert!(matches!(
            repo.search_multi("fight club", 1).await,
            Err(RepositoryError::RemoteUnavailable)
        ));
        // Local operations still work
        repo.add_planned_item(&planned(550, MediaType::Movie)).unwrap();
        assert_eq!(repo.list_planned().unwrap().len(), 1);
    }
}
