//! Library maintenance passes.

use cinelog_models::{now_millis, WatchedItem};
use cinelog_tmdb::MetadataSource;
use serde::Serialize;
use tracing::{error, info};

use crate::error::StoreError;
use crate::repository::Repository;
use crate::runtime::{estimate_runtime, typical_episode_runtime};

/// Tally of one runtime repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeRepairReport {
    /// Watched TV rows examined
    pub checked: usize,
    pub fixed: usize,
    /// Rows with a missing runtime that could not be repaired (no episode count)
    pub skipped: usize,
}

/// Result of a scheduled maintenance run.
#[derive(Debug, Clone, PartialEq)]
pub enum MaintenanceOutcome {
    Success(RuntimeRepairReport),
    /// The run failed; the scheduler should try again at the next tick.
    Retry(String),
}

/// Fill in runtimes for watched shows stored without one.
///
/// Shows with a positive runtime are left alone. For the rest, the stored
/// per-episode length is used when known, otherwise the title heuristic.
pub fn repair_missing_runtimes<S: MetadataSource>(
    repo: &Repository<S>,
) -> Result<RuntimeRepairReport, StoreError> {
    let mut report = RuntimeRepairReport::default();

    for item in repo.watched_shows()? {
        report.checked += 1;
        if !item.needs_runtime() {
            continue;
        }

        match repaired(&item, now_millis()) {
            Some(fixed) => {
                repo.add_watched_item(&fixed)?;
                info!(
                    operation = "repair_runtime",
                    key = %item.key(),
                    title = %item.title,
                    before = ?item.runtime,
                    after = ?fixed.runtime,
                    episode_runtime = ?fixed.episode_runtime,
                    episodes = ?fixed.total_episodes,
                    "Repaired runtime"
                );
                report.fixed += 1;
            }
            None => report.skipped += 1,
        }
    }

    info!(
        operation = "repair_runtime",
        checked = report.checked,
        fixed = report.fixed,
        skipped = report.skipped,
        "Runtime repair finished"
    );
    Ok(report)
}

/// The repaired row, or `None` when there is no episode count to work from.
fn repaired(item: &WatchedItem, now: i64) -> Option<WatchedItem> {
    let episodes = item.total_episodes.filter(|e| *e > 0)?;
    let per_episode = item
        .episode_runtime
        .filter(|m| *m > 0)
        .unwrap_or_else(|| typical_episode_runtime(&item.title));

    Some(WatchedItem {
        runtime: Some(estimate_runtime(Some(per_episode), episodes)),
        episode_runtime: Some(per_episode),
        last_updated: now,
        ..item.clone()
    })
}

/// Run every maintenance pass, folding failures into [`MaintenanceOutcome::Retry`].
pub fn run_maintenance<S: MetadataSource>(repo: &Repository<S>) -> MaintenanceOutcome {
    match repair_missing_runtimes(repo) {
        Ok(report) => MaintenanceOutcome::Success(report),
        Err(e) => {
            error!(operation = "maintenance", error = %e, "Maintenance run failed, will retry");
            MaintenanceOutcome::Retry(e.to_string())
        }
    }
}
