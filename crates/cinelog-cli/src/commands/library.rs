use super::ui::{self, Spinner};
use super::AppContext;
use crate::output::Output;
use crate::{PlannedCommands, WatchedCommands, WatchingCommands};
use cinelog_core::{planned_from_details, watched_from_details, watching_from_details, Details};
use cinelog_models::{now_millis, ItemKey, MediaType};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;

async fn fetch_details(ctx: &AppContext, key: ItemKey) -> Result<Details> {
    let spinner = Spinner::start(format!("Fetching {} from TMDB...", key));
    let result = ctx.repo.details(key).await;
    spinner.finish();
    result.map_err(|e| eyre!("Failed to fetch {}: {}", key, e))
}

fn report_removal(removed: bool, key: ItemKey, list: &str, output: &Output) {
    if removed {
        output.success(format!("Removed {} from {}", key, list));
    } else {
        output.warn(format!("{} is not in {}", key, list));
    }
}

pub async fn run_watched(cmd: WatchedCommands, output: &Output) -> Result<()> {
    match cmd {
        WatchedCommands::Add { media, id, rating } => {
            let rating = rating.unwrap_or(0.0);
            if !(0.0..=10.0).contains(&rating) {
                return Err(eyre!("Rating must be between 0 and 10, got {}", rating));
            }

            let ctx = AppContext::remote()?;
            let key = ItemKey::new(id, media.into());
            let details = fetch_details(&ctx, key).await?;
            let stored = ctx
                .repo
                .mark_watched(&watched_from_details(&details, rating, now_millis()))?;

            output.data(&stored);
            if stored.watch_count > 1 {
                output.success(format!("Watched {} again (x{})", stored.title, stored.watch_count));
            } else {
                output.success(format!("Marked {} as watched", stored.title));
            }
            Ok(())
        }
        WatchedCommands::List => {
            let ctx = AppContext::local()?;
            let items = ctx.repo.list_watched()?;
            output.data(&items);

            if output.is_human() {
                if items.is_empty() {
                    output.info("Nothing watched yet.");
                    return Ok(());
                }
                let mut table = ui::table(&["ID", "Type", "Title", "Year", "Runtime", "Rating", "Times", "Last watched"]);
                for item in &items {
                    table.add_row(vec![
                        Cell::new(item.id),
                        Cell::new(item.media_type),
                        Cell::new(&item.title),
                        Cell::new(ui::year(item.release_date.as_deref())),
                        Cell::new(ui::format_minutes(item.runtime)),
                        Cell::new(if item.user_rating > 0.0 {
                            format!("{:.1}", item.user_rating)
                        } else {
                            "-".to_string()
                        }),
                        Cell::new(item.watch_count),
                        Cell::new(ui::format_millis(item.last_updated)),
                    ]);
                }
                println!("{}", table);
            }
            Ok(())
        }
        WatchedCommands::Remove { media, id } => {
            let ctx = AppContext::local()?;
            let media: MediaType = media.into();
            let removed = ctx.repo.remove_watched_item(id, media)?;
            report_removal(removed, ItemKey::new(id, media), "watched", output);
            Ok(())
        }
    }
}

pub async fn run_planned(cmd: PlannedCommands, output: &Output) -> Result<()> {
    match cmd {
        PlannedCommands::Add { media, id } => {
            let ctx = AppContext::remote()?;
            let key = ItemKey::new(id, media.into());
            if let Some(collection) = ctx.repo.locate(key)? {
                output.warn(format!("{} is already in {}", key, collection));
            }

            let details = fetch_details(&ctx, key).await?;
            let item = planned_from_details(&details, now_millis());
            ctx.repo.add_planned_item(&item)?;

            output.data(&item);
            output.success(format!("Added {} to planned", item.title));
            Ok(())
        }
        PlannedCommands::List => {
            let ctx = AppContext::local()?;
            let items = ctx.repo.list_planned()?;
            output.data(&items);

            if output.is_human() {
                if items.is_empty() {
                    output.info("Nothing planned.");
                    return Ok(());
                }
                let mut table = ui::table(&["ID", "Type", "Title", "Year", "Runtime", "Added"]);
                for item in &items {
                    table.add_row(vec![
                        Cell::new(item.id),
                        Cell::new(item.media_type),
                        Cell::new(&item.title),
                        Cell::new(ui::year(item.release_date.as_deref())),
                        Cell::new(ui::format_minutes(item.runtime)),
                        Cell::new(ui::format_millis(item.date_added)),
                    ]);
                }
                println!("{}", table);
            }
            Ok(())
        }
        PlannedCommands::Remove { media, id } => {
            let ctx = AppContext::local()?;
            let media: MediaType = media.into();
            let removed = ctx.repo.remove_planned_item(id, media)?;
            report_removal(removed, ItemKey::new(id, media), "planned", output);
            Ok(())
        }
    }
}

pub async fn run_watching(cmd: WatchingCommands, output: &Output) -> Result<()> {
    match cmd {
        WatchingCommands::Add { media, id } => {
            let ctx = AppContext::remote()?;
            let key = ItemKey::new(id, media.into());
            let details = fetch_details(&ctx, key).await?;
            let item = watching_from_details(&details, now_millis());
            ctx.repo.start_watching(&item)?;

            output.data(&item);
            output.success(format!("Started watching {}", item.title));
            Ok(())
        }
        WatchingCommands::List => {
            let ctx = AppContext::local()?;
            let items = ctx.repo.list_watching()?;
            output.data(&items);

            if output.is_human() {
                if items.is_empty() {
                    output.info("Nothing in progress.");
                    return Ok(());
                }
                let mut table = ui::table(&["ID", "Type", "Title", "Progress", "Started"]);
                for item in &items {
                    let progress = match (item.current_season, item.current_episode) {
                        (Some(s), Some(e)) => format!("S{:02}E{:02}", s, e),
                        _ => "-".to_string(),
                    };
                    table.add_row(vec![
                        Cell::new(item.id),
                        Cell::new(item.media_type),
                        Cell::new(&item.title),
                        Cell::new(progress),
                        Cell::new(ui::format_millis(item.date_added)),
                    ]);
                }
                println!("{}", table);
            }
            Ok(())
        }
        WatchingCommands::Remove { media, id } => {
            let ctx = AppContext::local()?;
            let media: MediaType = media.into();
            let removed = ctx.repo.remove_watching_item(id, media)?;
            report_removal(removed, ItemKey::new(id, media), "watching", output);
            Ok(())
        }
        WatchingCommands::Progress {
            media,
            id,
            season,
            episode,
        } => {
            if season < 0 || episode < 0 {
                return Err(eyre!("Season and episode must not be negative"));
            }
            let ctx = AppContext::local()?;
            let key = ItemKey::new(id, media.into());
            if ctx.repo.advance_episode(key, season, episode)? {
                output.success(format!("{} is now at S{:02}E{:02}", key, season, episode));
            } else {
                output.warn(format!("{} is not in watching; add it with 'cinelog watching add'", key));
            }
            Ok(())
        }
    }
}

/// `2 days 3h 20m` style total.
fn format_total(minutes: i64) -> String {
    let days = minutes / (24 * 60);
    let hours = (minutes % (24 * 60)) / 60;
    let mins = minutes % 60;
    if days > 0 {
        format!("{} days {}h {:02}m", days, hours, mins)
    } else {
        format!("{}h {:02}m", hours, mins)
    }
}

pub fn run_stats(output: &Output) -> Result<()> {
    let ctx = AppContext::local()?;
    let stats = ctx.repo.stats()?;
    output.data(&stats);

    if output.is_human() {
        let mut table = ui::table(&["Library", ""]);
        table.add_row(vec![Cell::new("Watched movies"), Cell::new(stats.watched_movies)]);
        table.add_row(vec![Cell::new("Watched shows"), Cell::new(stats.watched_shows)]);
        table.add_row(vec![Cell::new("Watching"), Cell::new(stats.watching)]);
        table.add_row(vec![Cell::new("Planned"), Cell::new(stats.planned)]);
        table.add_row(vec![
            Cell::new("Time watched".bold().to_string()),
            Cell::new(format_total(stats.total_minutes)),
        ]);
        println!("{}", table);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_total() {
        assert_eq!(format_total(139), "2h 19m");
        assert_eq!(format_total(24 * 60 * 2 + 65), "2 days 1h 05m");
        assert_eq!(format_total(0), "0h 00m");
    }
}
