use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use cinelog_models::{Collection, ItemKey, MediaType, PlannedItem, WatchedItem, WatchingItem};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use tracing::debug;

use crate::error::StoreError;

const SCHEMA_V1: &str = include_str!("../migrations/001_initial.sql");

const WATCHED_COLUMNS: &str = "id, media_type, title, poster_path, release_date, runtime, overview, \
     vote_average, user_rating, episode_runtime, total_episodes, is_ongoing, status, genre_ids, \
     watch_count, last_updated";
const PLANNED_COLUMNS: &str = "id, media_type, title, poster_path, release_date, runtime, date_added";
const WATCHING_COLUMNS: &str = "id, media_type, title, poster_path, release_date, runtime, date_added, \
     current_season, current_episode";

/// SQLite-backed store for the three personal collections.
///
/// One connection behind a mutex; every public method holds the lock for a
/// single statement or transaction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Row counts and watch time across the collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct LibraryStats {
    pub watched: u64,
    pub planned: u64,
    pub watching: u64,
    pub watched_movies: u64,
    pub watched_shows: u64,
    /// Sum of `runtime * watch_count` over watched rows with a known runtime
    pub total_minutes: i64,
}

impl SqliteStore {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        debug!(operation = "store_open", path = %path.display(), "Opened library database");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Run `f` inside one transaction; any error rolls everything back.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    // ── Watched ─────────────────────────────────────────────────

    pub fn upsert_watched(&self, item: &WatchedItem) -> Result<(), StoreError> {
        upsert_watched(&*self.conn()?, item)
    }

    pub fn get_watched(&self, key: ItemKey) -> Result<Option<WatchedItem>, StoreError> {
        get_watched(&*self.conn()?, key)
    }

    /// Every watched row in insertion order.
    pub fn all_watched(&self) -> Result<Vec<WatchedItem>, StoreError> {
        query_watched(&*self.conn()?, "ORDER BY rowid", [])
    }

    /// Most recently updated first.
    pub fn recent_watched(&self) -> Result<Vec<WatchedItem>, StoreError> {
        query_watched(&*self.conn()?, "ORDER BY last_updated DESC, rowid DESC", [])
    }

    pub fn watched_by_media(&self, media_type: MediaType) -> Result<Vec<WatchedItem>, StoreError> {
        query_watched(
            &*self.conn()?,
            "WHERE media_type = ?1 ORDER BY rowid",
            params![media_type.as_str()],
        )
    }

    /// Returns whether a row was deleted.
    pub fn delete_watched(&self, key: ItemKey) -> Result<bool, StoreError> {
        delete_by_key(&*self.conn()?, "watched_items", key)
    }

    pub fn clear_watched(&self) -> Result<usize, StoreError> {
        Ok(self.conn()?.execute("DELETE FROM watched_items", [])?)
    }

    /// Record a (re)watch: bumps `watch_count` for a known title, otherwise
    /// inserts it. The title leaves planned and watching in the same transaction.
    pub fn mark_watched(&self, item: &WatchedItem) -> Result<WatchedItem, StoreError> {
        self.transaction(|tx| {
            let stored = match get_watched(tx, item.key())? {
                Some(previous) => WatchedItem {
                    watch_count: previous.watch_count.max(0) + 1,
                    user_rating: if item.user_rating > 0.0 {
                        item.user_rating
                    } else {
                        previous.user_rating
                    },
                    ..item.clone()
                },
                None => WatchedItem {
                    watch_count: item.watch_count.max(1),
                    ..item.clone()
                },
            };
            upsert_watched(tx, &stored)?;
            delete_by_key(tx, "planned_items", item.key())?;
            delete_by_key(tx, "watching_items", item.key())?;
            Ok(stored)
        })
    }

    // ── Planned ─────────────────────────────────────────────────

    pub fn upsert_planned(&self, item: &PlannedItem) -> Result<(), StoreError> {
        upsert_planned(&*self.conn()?, item)
    }

    pub fn get_planned(&self, key: ItemKey) -> Result<Option<PlannedItem>, StoreError> {
        query_planned(
            &*self.conn()?,
            "WHERE id = ?1 AND media_type = ?2",
            params![key.id, key.media_type.as_str()],
        )
        .map(|mut rows| rows.pop())
    }

    pub fn all_planned(&self) -> Result<Vec<PlannedItem>, StoreError> {
        query_planned(&*self.conn()?, "ORDER BY rowid", [])
    }

    pub fn recent_planned(&self) -> Result<Vec<PlannedItem>, StoreError> {
        query_planned(&*self.conn()?, "ORDER BY date_added DESC, rowid DESC", [])
    }

    pub fn delete_planned(&self, key: ItemKey) -> Result<bool, StoreError> {
        delete_by_key(&*self.conn()?, "planned_items", key)
    }

    pub fn clear_planned(&self) -> Result<usize, StoreError> {
        Ok(self.conn()?.execute("DELETE FROM planned_items", [])?)
    }

    // ── Watching ────────────────────────────────────────────────

    pub fn upsert_watching(&self, item: &WatchingItem) -> Result<(), StoreError> {
        upsert_watching(&*self.conn()?, item)
    }

    pub fn get_watching(&self, key: ItemKey) -> Result<Option<WatchingItem>, StoreError> {
        query_watching(
            &*self.conn()?,
            "WHERE id = ?1 AND media_type = ?2",
            params![key.id, key.media_type.as_str()],
        )
        .map(|mut rows| rows.pop())
    }

    pub fn all_watching(&self) -> Result<Vec<WatchingItem>, StoreError> {
        query_watching(&*self.conn()?, "ORDER BY rowid", [])
    }

    pub fn recent_watching(&self) -> Result<Vec<WatchingItem>, StoreError> {
        query_watching(&*self.conn()?, "ORDER BY date_added DESC, rowid DESC", [])
    }

    pub fn delete_watching(&self, key: ItemKey) -> Result<bool, StoreError> {
        delete_by_key(&*self.conn()?, "watching_items", key)
    }

    pub fn clear_watching(&self) -> Result<usize, StoreError> {
        Ok(self.conn()?.execute("DELETE FROM watching_items", [])?)
    }

    /// Move a title into watching, dropping it from planned.
    pub fn start_watching(&self, item: &WatchingItem) -> Result<(), StoreError> {
        self.transaction(|tx| {
            delete_by_key(tx, "planned_items", item.key())?;
            upsert_watching(tx, item)
        })
    }

    /// Returns `false` when the title is not in progress.
    pub fn update_watching_progress(
        &self,
        key: ItemKey,
        season: Option<i32>,
        episode: Option<i32>,
    ) -> Result<bool, StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE watching_items SET current_season = ?1, current_episode = ?2
             WHERE id = ?3 AND media_type = ?4",
            params![season, episode, key.id, key.media_type.as_str()],
        )?;
        Ok(changed > 0)
    }

    // ── Whole library ───────────────────────────────────────────

    /// Wipe all three tables and insert the given rows, atomically.
    pub fn replace_all(
        &self,
        watched: &[WatchedItem],
        planned: &[PlannedItem],
        watching: &[WatchingItem],
    ) -> Result<(), StoreError> {
        self.transaction(|tx| {
            tx.execute("DELETE FROM watched_items", [])?;
            tx.execute("DELETE FROM planned_items", [])?;
            tx.execute("DELETE FROM watching_items", [])?;
            for item in watched {
                upsert_watched(tx, item)?;
            }
            for item in planned {
                upsert_planned(tx, item)?;
            }
            for item in watching {
                upsert_watching(tx, item)?;
            }
            Ok(())
        })
    }

    /// Which collection holds `key`, checked watched, watching, planned in that order.
    pub fn locate(&self, key: ItemKey) -> Result<Option<Collection>, StoreError> {
        let conn = self.conn()?;
        for (table, collection) in [
            ("watched_items", Collection::Watched),
            ("watching_items", Collection::Watching),
            ("planned_items", Collection::Planned),
        ] {
            let found = conn
                .query_row(
                    &format!("SELECT 1 FROM {table} WHERE id = ?1 AND media_type = ?2"),
                    params![key.id, key.media_type.as_str()],
                    |_| Ok(()),
                )
                .optional()?;
            if found.is_some() {
                return Ok(Some(collection));
            }
        }
        Ok(None)
    }

    pub fn stats(&self) -> Result<LibraryStats, StoreError> {
        let conn = self.conn()?;
        let count = |sql: &str| -> Result<u64, StoreError> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n.max(0) as u64)
        };

        let total_minutes: i64 = conn.query_row(
            "SELECT COALESCE(SUM(runtime * watch_count), 0) FROM watched_items
             WHERE runtime IS NOT NULL AND runtime > 0",
            [],
            |row| row.get(0),
        )?;

        Ok(LibraryStats {
            watched: count("SELECT COUNT(*) FROM watched_items")?,
            planned: count("SELECT COUNT(*) FROM planned_items")?,
            watching: count("SELECT COUNT(*) FROM watching_items")?,
            watched_movies: count("SELECT COUNT(*) FROM watched_items WHERE media_type = 'movie'")?,
            watched_shows: count("SELECT COUNT(*) FROM watched_items WHERE media_type = 'tv'")?,
            total_minutes,
        })
    }
}

// ── Migrations ──────────────────────────────────────────────────

/// Run schema migrations using `PRAGMA user_version` for version tracking.
fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

// ── Statement helpers ───────────────────────────────────────────

fn delete_by_key(conn: &Connection, table: &str, key: ItemKey) -> Result<bool, StoreError> {
    let deleted = conn.execute(
        &format!("DELETE FROM {table} WHERE id = ?1 AND media_type = ?2"),
        params![key.id, key.media_type.as_str()],
    )?;
    Ok(deleted > 0)
}

fn upsert_watched(conn: &Connection, item: &WatchedItem) -> Result<(), StoreError> {
    let genre_ids = serde_json::to_string(&item.genre_ids)?;
    conn.execute(
        "INSERT INTO watched_items (id, media_type, title, poster_path, release_date, runtime,
             overview, vote_average, user_rating, episode_runtime, total_episodes, is_ongoing,
             status, genre_ids, watch_count, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT(id, media_type) DO UPDATE SET
             title = excluded.title, poster_path = excluded.poster_path,
             release_date = excluded.release_date, runtime = excluded.runtime,
             overview = excluded.overview, vote_average = excluded.vote_average,
             user_rating = excluded.user_rating, episode_runtime = excluded.episode_runtime,
             total_episodes = excluded.total_episodes, is_ongoing = excluded.is_ongoing,
             status = excluded.status, genre_ids = excluded.genre_ids,
             watch_count = excluded.watch_count, last_updated = excluded.last_updated",
        params![
            item.id,
            item.media_type.as_str(),
            item.title,
            item.poster_path,
            item.release_date,
            item.runtime,
            item.overview,
            item.vote_average,
            item.user_rating,
            item.episode_runtime,
            item.total_episodes,
            item.is_ongoing,
            item.status,
            genre_ids,
            item.watch_count,
            item.last_updated,
        ],
    )?;
    Ok(())
}

fn upsert_planned(conn: &Connection, item: &PlannedItem) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO planned_items (id, media_type, title, poster_path, release_date, runtime, date_added)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id, media_type) DO UPDATE SET
             title = excluded.title, poster_path = excluded.poster_path,
             release_date = excluded.release_date, runtime = excluded.runtime,
             date_added = excluded.date_added",
        params![
            item.id,
            item.media_type.as_str(),
            item.title,
            item.poster_path,
            item.release_date,
            item.runtime,
            item.date_added,
        ],
    )?;
    Ok(())
}

fn upsert_watching(conn: &Connection, item: &WatchingItem) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO watching_items (id, media_type, title, poster_path, release_date, runtime,
             date_added, current_season, current_episode)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id, media_type) DO UPDATE SET
             title = excluded.title, poster_path = excluded.poster_path,
             release_date = excluded.release_date, runtime = excluded.runtime,
             date_added = excluded.date_added, current_season = excluded.current_season,
             current_episode = excluded.current_episode",
        params![
            item.id,
            item.media_type.as_str(),
            item.title,
            item.poster_path,
            item.release_date,
            item.runtime,
            item.date_added,
            item.current_season,
            item.current_episode,
        ],
    )?;
    Ok(())
}

fn get_watched(conn: &Connection, key: ItemKey) -> Result<Option<WatchedItem>, StoreError> {
    query_watched(
        conn,
        "WHERE id = ?1 AND media_type = ?2",
        params![key.id, key.media_type.as_str()],
    )
    .map(|mut rows| rows.pop())
}

fn query_watched(conn: &Connection, tail: &str, params: impl rusqlite::Params) -> Result<Vec<WatchedItem>, StoreError> {
    let mut stmt = conn.prepare(&format!("SELECT {WATCHED_COLUMNS} FROM watched_items {tail}"))?;
    let rows = stmt
        .query_map(params, row_to_watched)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_planned(conn: &Connection, tail: &str, params: impl rusqlite::Params) -> Result<Vec<PlannedItem>, StoreError> {
    let mut stmt = conn.prepare(&format!("SELECT {PLANNED_COLUMNS} FROM planned_items {tail}"))?;
    let rows = stmt
        .query_map(params, row_to_planned)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_watching(conn: &Connection, tail: &str, params: impl rusqlite::Params) -> Result<Vec<WatchingItem>, StoreError> {
    let mut stmt = conn.prepare(&format!("SELECT {WATCHING_COLUMNS} FROM watching_items {tail}"))?;
    let rows = stmt
        .query_map(params, row_to_watching)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Row mapping helpers ─────────────────────────────────────────

fn media_type_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<MediaType> {
    let raw: String = row.get(idx)?;
    raw.parse::<MediaType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn genre_ids_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<i64>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_watched(row: &Row<'_>) -> rusqlite::Result<WatchedItem> {
    Ok(WatchedItem {
        id: row.get(0)?,
        media_type: media_type_at(row, 1)?,
        title: row.get(2)?,
        poster_path: row.get(3)?,
        release_date: row.get(4)?,
        runtime: row.get(5)?,
        overview: row.get(6)?,
        vote_average: row.get(7)?,
        user_rating: row.get(8)?,
        episode_runtime: row.get(9)?,
        total_episodes: row.get(10)?,
        is_ongoing: row.get(11)?,
        status: row.get(12)?,
        genre_ids: genre_ids_at(row, 13)?,
        watch_count: row.get(14)?,
        last_updated: row.get(15)?,
    })
}

fn row_to_planned(row: &Row<'_>) -> rusqlite::Result<PlannedItem> {
    Ok(PlannedItem {
        id: row.get(0)?,
        media_type: media_type_at(row, 1)?,
        title: row.get(2)?,
        poster_path: row.get(3)?,
        release_date: row.get(4)?,
        runtime: row.get(5)?,
        date_added: row.get(6)?,
    })
}

fn row_to_watching(row: &Row<'_>) -> rusqlite::Result<WatchingItem> {
    Ok(WatchingItem {
        id: row.get(0)?,
        media_type: media_type_at(row, 1)?,
        title: row.get(2)?,
        poster_path: row.get(3)?,
        release_date: row.get(4)?,
        runtime: row.get(5)?,
        date_added: row.get(6)?,
        current_season: row.get(7)?,
        current_episode: row.get(8)?,
    })
}
