//! JSON backup and restore of the three collections.
//!
//! A backup is one pretty-printed document:
//!
//! ```json
//! { "version": 1, "createdAt": "2024-05-01 12:00:00",
//!   "watched": [...], "planned": [...], "watching": [...] }
//! ```
//!
//! Restore validates the whole document before touching the store, then
//! replaces every collection inside a single transaction.

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use cinelog_config::{BackupConfig, PathManager};
use cinelog_models::{ItemKey, PlannedItem, WatchedItem, WatchingItem};
use cinelog_tmdb::MetadataSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::BackupError;
use crate::repository::Repository;

pub const BACKUP_VERSION: u64 = 1;
const FILE_PREFIX: &str = "cinelog_backup_";
const FILE_SUFFIX: &str = ".json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u64,
    /// Local time, `yyyy-MM-dd HH:mm:ss`
    #[serde(default)]
    pub created_at: String,
    pub watched: Vec<WatchedItem>,
    pub planned: Vec<PlannedItem>,
    pub watching: Vec<WatchingItem>,
}

/// A backup file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct BackupFile {
    pub name: String,
    pub path: PathBuf,
    pub size_kb: u64,
    pub modified: DateTime<Local>,
}

/// Row counts loaded by a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub watched: usize,
    pub planned: usize,
    pub watching: usize,
}

impl RestoreSummary {
    pub fn total(&self) -> usize {
        self.watched + self.planned + self.watching
    }
}

pub fn backup_file_name(at: DateTime<Local>) -> String {
    format!("{}{}{}", FILE_PREFIX, at.format("%Y%m%d_%H%M%S"), FILE_SUFFIX)
}

/// `cinelog_backup_<ts>.json`, then `cinelog_backup_<ts>_2.json`, ... for the same second.
fn backup_file_name_with_seq(at: DateTime<Local>, seq: u32) -> String {
    if seq <= 1 {
        return backup_file_name(at);
    }
    format!("{}{}_{}{}", FILE_PREFIX, at.format("%Y%m%d_%H%M%S"), seq, FILE_SUFFIX)
}

fn is_backup_file_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
}

/// Serialize a document. File and stream exports both go through here.
pub fn render_document(document: &BackupDocument) -> Result<Vec<u8>, BackupError> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse and validate a backup document without touching any state.
pub fn parse_document(content: &str) -> Result<BackupDocument, BackupError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| BackupError::InvalidDocument(format!("not valid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| BackupError::InvalidDocument("top level is not an object".to_string()))?;

    let version = match object.get("version") {
        None => return Err(BackupError::InvalidDocument("missing version".to_string())),
        Some(v) => v
            .as_u64()
            .ok_or_else(|| BackupError::InvalidDocument(format!("version is not a positive integer: {}", v)))?,
    };
    if version != BACKUP_VERSION {
        return Err(BackupError::UnsupportedVersion(version));
    }

    for field in ["watched", "planned", "watching"] {
        match object.get(field) {
            Some(Value::Array(_)) => {}
            Some(_) => return Err(BackupError::InvalidDocument(format!("'{}' is not an array", field))),
            None => return Err(BackupError::InvalidDocument(format!("missing '{}'", field))),
        }
    }

    let document: BackupDocument =
        serde_json::from_value(value).map_err(|e| BackupError::InvalidDocument(e.to_string()))?;

    check_unique("watched", document.watched.iter().map(WatchedItem::key))?;
    check_unique("planned", document.planned.iter().map(PlannedItem::key))?;
    check_unique("watching", document.watching.iter().map(WatchingItem::key))?;
    Ok(document)
}

/// Each identity may appear once per collection; restore never merges rows.
fn check_unique(field: &str, keys: impl Iterator<Item = ItemKey>) -> Result<(), BackupError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(BackupError::InvalidDocument(format!(
                "'{}' lists {} more than once",
                field, key
            )));
        }
    }
    Ok(())
}

/// Creates, lists, deletes and restores backups for one repository.
pub struct BackupManager<'a, S> {
    repo: &'a Repository<S>,
    backup_dir: PathBuf,
    keep_last: Option<usize>,
}

impl<'a, S: MetadataSource> BackupManager<'a, S> {
    pub fn new(repo: &'a Repository<S>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            backup_dir: backup_dir.into(),
            keep_last: None,
        }
    }

    /// Backup directory from config, falling back to `<data_dir>/backups`.
    pub fn from_config(repo: &'a Repository<S>, config: &BackupConfig, paths: &PathManager) -> Self {
        let dir = config.directory.clone().unwrap_or_else(|| paths.backup_dir());
        Self::new(repo, dir).with_keep_last(config.keep_last)
    }

    pub fn with_keep_last(mut self, keep_last: Option<usize>) -> Self {
        self.keep_last = keep_last;
        self
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    fn snapshot(&self, at: DateTime<Local>) -> Result<BackupDocument, BackupError> {
        Ok(BackupDocument {
            version: BACKUP_VERSION,
            created_at: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            watched: self.repo.get_watched_items_for_backup()?,
            planned: self.repo.get_planned_items_for_backup()?,
            watching: self.repo.get_watching_items_for_backup()?,
        })
    }

    /// Write a timestamped backup into the backup directory.
    pub fn create_backup(&self) -> Result<BackupFile, BackupError> {
        self.create_backup_at(Local::now())
    }

    pub fn create_backup_at(&self, at: DateTime<Local>) -> Result<BackupFile, BackupError> {
        let document = self.snapshot(at)?;
        let bytes = render_document(&document)?;

        fs::create_dir_all(&self.backup_dir)?;
        let path = self.write_new_backup(at, &bytes)?;

        info!(
            operation = "backup_create",
            path = %path.display(),
            watched = document.watched.len(),
            planned = document.planned.len(),
            watching = document.watching.len(),
            "Backup written"
        );

        if let Some(keep) = self.keep_last {
            self.prune_backups(keep)?;
        }

        backup_file(&path)
    }

    /// Never replaces an existing backup: a second backup in the same second
    /// gets a sequence suffix.
    fn write_new_backup(&self, at: DateTime<Local>, bytes: &[u8]) -> Result<PathBuf, BackupError> {
        let mut seq = 1;
        loop {
            let path = self.backup_dir.join(backup_file_name_with_seq(at, seq));
            match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    file.sync_all()?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => seq += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Export to a user-chosen file. The target is replaced only once the
    /// whole document has been written; a failed export leaves it untouched.
    pub fn export_to_path(&self, path: &Path) -> Result<(), BackupError> {
        let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let bytes = render_document(&self.snapshot(Local::now())?)?;
        let mut staging = NamedTempFile::new_in(&parent)?;
        staging.write_all(&bytes)?;
        staging.as_file().sync_all()?;
        staging.persist(path).map_err(|e| BackupError::Io(e.error))?;

        info!(operation = "backup_export", path = %path.display(), bytes = bytes.len(), "Backup exported");
        Ok(())
    }

    /// Stream a backup to any writer (a file picked by the user, stdout).
    pub fn export_to_writer<W: Write>(&self, writer: &mut W) -> Result<(), BackupError> {
        self.export_to_writer_at(writer, Local::now())
    }

    pub fn export_to_writer_at<W: Write>(&self, writer: &mut W, at: DateTime<Local>) -> Result<(), BackupError> {
        let bytes = render_document(&self.snapshot(at)?)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        debug!(operation = "backup_export", bytes = bytes.len(), "Backup exported");
        Ok(())
    }

    /// Replace the library with the contents of a backup file.
    pub fn restore_from_path(&self, path: &Path) -> Result<RestoreSummary, BackupError> {
        if !path.is_file() {
            return Err(BackupError::NotFound(path.to_path_buf()));
        }
        let file = fs::File::open(path)?;
        let summary = self.restore_from_reader(file)?;
        info!(operation = "backup_restore", path = %path.display(), total = summary.total(), "Restored backup");
        Ok(summary)
    }

    /// Replace the library with a document read from `reader`.
    ///
    /// Nothing changes unless the whole document validates.
    pub fn restore_from_reader<R: Read>(&self, mut reader: R) -> Result<RestoreSummary, BackupError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let document = match parse_document(&content) {
            Ok(document) => document,
            Err(e) => {
                warn!(operation = "backup_restore", error = %e, "Rejected backup document");
                return Err(e);
            }
        };

        self.repo
            .replace_all(&document.watched, &document.planned, &document.watching)?;

        Ok(RestoreSummary {
            watched: document.watched.len(),
            planned: document.planned.len(),
            watching: document.watching.len(),
        })
    }

    /// Backups in the backup directory, newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupFile>, BackupError> {
        if !self.backup_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_backup_file_name(&name) || !entry.file_type()?.is_file() {
                continue;
            }
            files.push(backup_file(&entry.path())?);
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(files)
    }

    /// Remove one backup by bare file name.
    pub fn delete_backup(&self, name: &str) -> Result<(), BackupError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(BackupError::InvalidName(name.to_string()));
        }

        let path = self.backup_dir.join(name);
        if !path.is_file() {
            return Err(BackupError::NotFound(path));
        }
        fs::remove_file(&path)?;
        info!(operation = "backup_delete", name, "Backup deleted");
        Ok(())
    }

    /// Keep the `keep` newest backups and delete the rest. Returns removed names.
    pub fn prune_backups(&self, keep: usize) -> Result<Vec<String>, BackupError> {
        let mut removed = Vec::new();
        for file in self.list_backups()?.into_iter().skip(keep) {
            fs::remove_file(&file.path)?;
            removed.push(file.name);
        }
        if !removed.is_empty() {
            info!(operation = "backup_prune", removed = removed.len(), keep, "Pruned old backups");
        }
        Ok(removed)
    }
}

fn backup_file(path: &Path) -> Result<BackupFile, BackupError> {
    let metadata = fs::metadata(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(BackupFile {
        name,
        path: path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
        size_kb: metadata.len().div_ceil(1024),
        modified: DateTime::<Local>::from(metadata.modified()?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use chrono::TimeZone;
    use cinelog_models::{ItemKey, MediaType};
    use cinelog_tmdb::TmdbClient;
    use tempfile::TempDir;

    fn repo() -> Repository<TmdbClient> {
        Repository::local(SqliteStore::open_memory().unwrap())
    }

    fn at(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, hour, 30, 0).unwrap()
    }

    fn fight_club() -> WatchedItem {
        WatchedItem {
            id: 550,
            title: "Fight Club".to_string(),
            poster_path: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
            release_date: Some("1999-10-15".to_string()),
            runtime: Some(139),
            media_type: MediaType::Movie,
            overview: None,
            vote_average: 8.4,
            user_rating: 9.0,
            episode_runtime: None,
            total_episodes: None,
            is_ongoing: false,
            status: Some("Released".to_string()),
            genre_ids: vec![18],
            watch_count: 1,
            last_updated: 1_714_560_000_000,
        }
    }

    fn watching_got() -> WatchingItem {
        WatchingItem {
            id: 1399,
            title: "Game of Thrones".to_string(),
            poster_path: None,
            release_date: Some("2011-04-17".to_string()),
            runtime: Some(4380),
            media_type: MediaType::Tv,
            date_added: 1_714_560_000_000,
            current_episode: Some(4),
            current_season: Some(2),
        }
    }

    #[test]
    fn test_backup_file_name() {
        assert_eq!(backup_file_name(at(9)), "cinelog_backup_20240501_093000.json");
    }

    #[test]
    fn test_single_movie_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = repo();
        repo.add_watched_item(&fight_club()).unwrap();
        let manager = BackupManager::new(&repo, dir.path());

        let file = manager.create_backup_at(at(12)).unwrap();
        let content = fs::read_to_string(&file.path).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["createdAt"], "2024-05-01 12:30:00");
        assert_eq!(value["watched"].as_array().unwrap().len(), 1);
        assert_eq!(value["watched"][0]["id"], 550);
        assert_eq!(value["watched"][0]["mediaType"], "movie");
        assert_eq!(value["watched"][0]["runtime"], 139);
        assert_eq!(value["planned"].as_array().unwrap().len(), 0);

        // Restore into a library with different contents
        repo.delete_all_watched().unwrap();
        repo.add_watching_item(&watching_got()).unwrap();
        let summary = manager.restore_from_path(&file.path).unwrap();
        assert_eq!(
            summary,
            RestoreSummary {
                watched: 1,
                planned: 0,
                watching: 0
            }
        );
        assert_eq!(repo.get_watched_items_for_backup().unwrap(), vec![fight_club()]);
        assert!(repo.get_watching_items_for_backup().unwrap().is_empty());
    }

    #[test]
    fn test_file_and_writer_exports_are_identical() {
        let dir = TempDir::new().unwrap();
        let repo = repo();
        repo.add_watched_item(&fight_club()).unwrap();
        repo.add_watching_item(&watching_got()).unwrap();
        let manager = BackupManager::new(&repo, dir.path());

        let file = manager.create_backup_at(at(8)).unwrap();
        let mut buffer = Vec::new();
        manager.export_to_writer_at(&mut buffer, at(8)).unwrap();

        assert_eq!(fs::read(&file.path).unwrap(), buffer);
    }

    #[test]
    fn test_watching_field_order() {
        let repo = repo();
        repo.add_watching_item(&watching_got()).unwrap();
        let manager = BackupManager::new(&repo, "unused");

        let mut buffer = Vec::new();
        manager.export_to_writer_at(&mut buffer, at(1)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let episode = text.find("currentEpisode").unwrap();
        let season = text.find("currentSeason").unwrap();
        assert!(episode < season);
    }

    #[test]
    fn test_restore_rejects_bad_version_and_keeps_rows() {
        let repo = repo();
        repo.add_watched_item(&fight_club()).unwrap();
        let manager = BackupManager::new(&repo, "unused");

        let missing = r#"{"watched": [], "planned": [], "watching": []}"#;
        assert!(matches!(
            manager.restore_from_reader(missing.as_bytes()),
            Err(BackupError::InvalidDocument(_))
        ));

        let future = r#"{"version": 7, "watched": [], "planned": [], "watching": []}"#;
        assert!(matches!(
            manager.restore_from_reader(future.as_bytes()),
            Err(BackupError::UnsupportedVersion(7))
        ));

        assert_eq!(repo.get_watched_items_for_backup().unwrap().len(), 1);
    }

    #[test]
    fn test_restore_rejects_malformed_documents() {
        let repo = repo();
        repo.add_watched_item(&fight_club()).unwrap();
        let manager = BackupManager::new(&repo, "unused");

        for doc in [
            "not json",
            "[1, 2, 3]",
            r#"{"version": 1, "watched": [], "planned": []}"#,
            r#"{"version": 1, "watched": {}, "planned": [], "watching": []}"#,
            r#"{"version": 1, "watched": [{"id": "x"}], "planned": [], "watching": []}"#,
            r#"{"version": 1, "watched": [], "planned": [{"id": 1, "title": "a", "mediaType": "book", "dateAdded": 0}], "watching": []}"#,
        ] {
            let result = manager.restore_from_reader(doc.as_bytes());
            assert!(matches!(result, Err(BackupError::InvalidDocument(_))), "accepted: {}", doc);
        }
        assert_eq!(repo.get_watched_items_for_backup().unwrap(), vec![fight_club()]);
    }

    #[test]
    fn test_restore_accepts_sparse_records() {
        let repo = repo();
        let manager = BackupManager::new(&repo, "unused");
        let doc = r#"{
            "version": 1,
            "createdAt": "2024-01-01 00:00:00",
            "watched": [{"id": 1399, "title": "Game of Thrones", "mediaType": "tv", "lastUpdated": 5}],
            "planned": [{"id": 1399, "title": "Movie 1399", "mediaType": "movie", "dateAdded": 6}],
            "watching": []
        }"#;

        let summary = manager.restore_from_reader(doc.as_bytes()).unwrap();
        assert_eq!(summary.total(), 2);

        let show = repo.get_watched_item(ItemKey::tv(1399)).unwrap().unwrap();
        assert_eq!(show.runtime, None);
        assert_eq!(show.watch_count, 1);
        assert!(repo.get_planned_item(ItemKey::movie(1399)).unwrap().is_some());
    }

    #[test]
    fn test_restore_missing_file() {
        let dir = TempDir::new().unwrap();
        let repo = repo();
        let manager = BackupManager::new(&repo, dir.path());
        let result = manager.restore_from_path(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(BackupError::NotFound(_))));
    }

    #[test]
    fn test_list_backups_newest_first() {
        let dir = TempDir::new().unwrap();
        let repo = repo();
        let manager = BackupManager::new(&repo, dir.path());

        for hour in 1..=3 {
            manager.create_backup_at(at(hour)).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let names: Vec<String> = manager.list_backups().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "cinelog_backup_20240501_033000.json",
                "cinelog_backup_20240501_023000.json",
                "cinelog_backup_20240501_013000.json",
            ]
        );

        let listed = manager.list_backups().unwrap();
        assert!(listed.iter().all(|f| f.path.is_absolute() && f.size_kb >= 1));
    }

    #[test]
    fn test_list_backups_without_directory() {
        let dir = TempDir::new().unwrap();
        let repo = repo();
        let manager = BackupManager::new(&repo, dir.path().join("missing"));
        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_delete_backup() {
        let dir = TempDir::new().unwrap();
        let repo = repo();
        let manager = BackupManager::new(&repo, dir.path());
        let file = manager.create_backup_at(at(4)).unwrap();

        assert!(matches!(
            manager.delete_backup("../library.db"),
            Err(BackupError::InvalidName(_))
        ));
        manager.delete_backup(&file.name).unwrap();
        assert!(!file.path.exists());
        assert!(matches!(manager.delete_backup(&file.name), Err(BackupError::NotFound(_))));
    }

    #[test]
    fn test_keep_last_prunes_on_create() {
        let dir = TempDir::new().unwrap();
        let repo = repo();
        let manager = BackupManager::new(&repo, dir.path()).with_keep_last(Some(2));

        manager.create_backup_at(at(1)).unwrap();
        manager.create_backup_at(at(2)).unwrap();
        manager.create_backup_at(at(3)).unwrap();

        let names: Vec<String> = manager.list_backups().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names.len(), 2);
        assert!(!names.contains(&"cinelog_backup_20240501_013000.json".to_string()));
    }

    fn breaking_bad_watched() -> WatchedItem {
        WatchedItem {
            id: 550,
            title: "Breaking Bad".to_string(),
            poster_path: None,
            release_date: Some("2008-01-20".to_string()),
            runtime: Some(2961),
            media_type: MediaType::Tv,
            overview: Some("A chemistry teacher turns to crime.".to_string()),
            vote_average: 8.912345678901234,
            user_rating: 9.980287151475233,
            episode_runtime: Some(47),
            total_episodes: Some(63),
            is_ongoing: false,
            status: Some("Ended".to_string()),
            genre_ids: vec![18, 80],
            watch_count: 3,
            last_updated: 1_714_570_000_123,
        }
    }

    fn planned(id: i64, media_type: MediaType, title: &str) -> PlannedItem {
        PlannedItem {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/{}.jpg", id)),
            release_date: None,
            runtime: Some(120),
            media_type,
            date_added: 1_714_000_000_000 + id,
        }
    }

    #[test]
    fn test_full_library_round_trip() {
        let repo = repo();
        let mut movie = fight_club();
        movie.user_rating = 7.123456789012345;
        movie.vote_average = 0.1 + 0.2;
        repo.add_watched_item(&movie).unwrap();
        repo.add_watched_item(&breaking_bad_watched()).unwrap();
        repo.add_planned_item(&planned(27205, MediaType::Movie, "Inception")).unwrap();
        repo.add_planned_item(&planned(27205, MediaType::Tv, "Show 27205")).unwrap();
        repo.add_watching_item(&watching_got()).unwrap();

        let watched = repo.get_watched_items_for_backup().unwrap();
        let planned_rows = repo.get_planned_items_for_backup().unwrap();
        let watching = repo.get_watching_items_for_backup().unwrap();

        let manager = BackupManager::new(&repo, "unused");
        let mut buffer = Vec::new();
        manager.export_to_writer_at(&mut buffer, at(10)).unwrap();

        // Diverge from the snapshot before restoring
        repo.remove_watched_item(550, MediaType::Tv).unwrap();
        repo.delete_all_planned().unwrap();
        repo.add_planned_item(&planned(1, MediaType::Movie, "Extra")).unwrap();
        repo.advance_episode(ItemKey::tv(1399), 5, 1).unwrap();

        let summary = manager.restore_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(
            summary,
            RestoreSummary {
                watched: 2,
                planned: 2,
                watching: 1
            }
        );
        assert_eq!(repo.get_watched_items_for_backup().unwrap(), watched);
        assert_eq!(repo.get_planned_items_for_backup().unwrap(), planned_rows);
        assert_eq!(repo.get_watching_items_for_backup().unwrap(), watching);

        let show = repo.get_watched_item(ItemKey::tv(550)).unwrap().unwrap();
        assert_eq!(show.user_rating.to_bits(), 9.980287151475233f64.to_bits());
        assert_eq!(show.vote_average.to_bits(), 8.912345678901234f64.to_bits());
        let film = repo.get_watched_item(ItemKey::movie(550)).unwrap().unwrap();
        assert_eq!(film.vote_average.to_bits(), (0.1f64 + 0.2).to_bits());
    }

    #[test]
    fn test_restore_rejects_duplicate_identity() {
        let repo = repo();
        repo.add_watching_item(&watching_got()).unwrap();
        let manager = BackupManager::new(&repo, "unused");

        let doc = r#"{
            "version": 1,
            "watched": [
                {"id": 1, "title": "First", "mediaType": "movie", "lastUpdated": 1},
                {"id": 1, "title": "Second", "mediaType": "movie", "lastUpdated": 2}
            ],
            "planned": [],
            "watching": []
        }"#;
        assert!(matches!(
            manager.restore_from_reader(doc.as_bytes()),
            Err(BackupError::InvalidDocument(_))
        ));
        assert!(repo.get_watched_items_for_backup().unwrap().is_empty());
        assert_eq!(repo.get_watching_items_for_backup().unwrap(), vec![watching_got()]);

        // Same id under both media types is two identities
        let doc = r#"{
            "version": 1,
            "watched": [
                {"id": 1, "title": "Film", "mediaType": "movie", "lastUpdated": 1},
                {"id": 1, "title": "Show", "mediaType": "tv", "lastUpdated": 2}
            ],
            "planned": [],
            "watching": []
        }"#;
        let summary = manager.restore_from_reader(doc.as_bytes()).unwrap();
        assert_eq!(summary.watched, repo.get_watched_items_for_backup().unwrap().len());
    }

    #[test]
    fn test_backups_in_same_second_are_kept() {
        let dir = TempDir::new().unwrap();
        let repo = repo();
        repo.add_watched_item(&fight_club()).unwrap();
        let manager = BackupManager::new(&repo, dir.path());

        let first = manager.create_backup_at(at(6)).unwrap();
        repo.add_watching_item(&watching_got()).unwrap();
        let second = manager.create_backup_at(at(6)).unwrap();

        assert_eq!(first.name, "cinelog_backup_20240501_063000.json");
        assert_eq!(second.name, "cinelog_backup_20240501_063000_2.json");
        let first_doc = parse_document(&fs::read_to_string(&first.path).unwrap()).unwrap();
        assert!(first_doc.watching.is_empty());
        assert_eq!(manager.list_backups().unwrap().len(), 2);
        assert_eq!(manager.list_backups().unwrap()[0].name, second.name);
    }

    #[test]
    fn test_export_to_path() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("exports").join("library.json");

        let repo = repo();
        repo.add_watched_item(&fight_club()).unwrap();
        BackupManager::new(&repo, "unused").export_to_path(&target).unwrap();
        let document = parse_document(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(document.watched, vec![fight_club()]);
    }

    #[test]
    fn test_failed_export_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("library.json");
        fs::write(&target, "previous export").unwrap();

        let store = SqliteStore::open_memory().unwrap();
        store
            .transaction(|tx| {
                tx.execute_batch("DROP TABLE planned_items")?;
                Ok(())
            })
            .unwrap();
        let repo: Repository<TmdbClient> = Repository::local(store);

        let result = BackupManager::new(&repo, "unused").export_to_path(&target);
        assert!(matches!(result, Err(BackupError::Store(_))));
        assert_eq!(fs::read_to_string(&target).unwrap(), "previous export");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
