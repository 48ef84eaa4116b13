use super::ui::{self, Spinner};
use super::AppContext;
use crate::output::Output;
use crate::{BrowseList, BrowseTarget};
use cinelog_core::{Details, Repository};
use cinelog_models::{Collection, ItemKey, MediaType};
use cinelog_tmdb::{DiscoverQuery, MediaPage, MultiResult, Page, TimeWindow, TmdbClient};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;

/// One printable search/browse result.
struct Row {
    id: i64,
    media_type: Option<MediaType>,
    title: String,
    date: Option<String>,
    vote: Option<f64>,
}

impl Row {
    fn from_multi(result: &MultiResult) -> Self {
        let (date, vote) = match result {
            MultiResult::Movie(m) => (m.release_date.clone(), Some(m.vote_average)),
            MultiResult::Tv(t) => (t.first_air_date.clone(), Some(t.vote_average)),
            MultiResult::Person(p) => (p.known_for_department.clone(), None),
        };
        Self {
            id: result.id(),
            media_type: result.media_type(),
            title: result.title().to_string(),
            date,
            vote,
        }
    }
}

/// Re-tag a single-kind page so every listing prints the same way.
fn into_multi<T>(page: Page<T>, tag: fn(T) -> MultiResult) -> Page<MultiResult> {
    Page {
        page: page.page,
        results: page.results.into_iter().map(tag).collect(),
        total_pages: page.total_pages,
        total_results: page.total_results,
    }
}

fn media_page_into_multi(listing: MediaPage) -> Page<MultiResult> {
    match listing {
        MediaPage::Movies(p) => into_multi(p, MultiResult::Movie),
        MediaPage::Tv(p) => into_multi(p, MultiResult::Tv),
    }
}

fn collection_label(collection: Option<Collection>) -> String {
    match collection {
        Some(Collection::Watched) => "watched".green().to_string(),
        Some(Collection::Watching) => "watching".yellow().to_string(),
        Some(Collection::Planned) => "planned".cyan().to_string(),
        None => String::new(),
    }
}

/// Emit a listing: JSON as-is, or a table marking titles already in the library.
fn print_listing(repo: &Repository<TmdbClient>, listing: &Page<MultiResult>, output: &Output) -> Result<()> {
    output.data(listing);
    if !output.is_human() {
        return Ok(());
    }
    if listing.results.is_empty() {
        output.info("No results.");
        return Ok(());
    }

    let mut table = ui::table(&["ID", "Type", "Title", "Year", "Rating", "Library"]);
    for row in listing.results.iter().map(Row::from_multi) {
        let (kind, date, library) = match row.media_type {
            Some(media_type) => (
                media_type.as_str().to_string(),
                ui::year(row.date.as_deref()),
                collection_label(repo.locate(ItemKey::new(row.id, media_type))?),
            ),
            None => ("person".to_string(), row.date.clone().unwrap_or_default(), String::new()),
        };
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(kind),
            Cell::new(&row.title),
            Cell::new(date),
            Cell::new(row.vote.map(|v| format!("{:.1}", v)).unwrap_or_default()),
            Cell::new(library),
        ]);
    }
    println!("{}", table);
    if listing.has_next() {
        println!(
            "{}",
            format!("Page {} of {} (use --page for more)", listing.page, listing.total_pages).bright_black()
        );
    }
    Ok(())
}

pub async fn run_search(query: &str, movies: bool, tv: bool, page: u32, output: &Output) -> Result<()> {
    let ctx = AppContext::remote()?;
    let spinner = Spinner::start(format!("Searching TMDB for \"{}\"...", query));

    let result = if movies {
        ctx.repo
            .search_movies(query, page)
            .await
            .map(|p| into_multi(p, MultiResult::Movie))
    } else if tv {
        ctx.repo.search_tv(query, page).await.map(|p| into_multi(p, MultiResult::Tv))
    } else {
        ctx.repo.search_multi(query, page).await
    };
    spinner.finish();

    let listing = result.map_err(|e| eyre!("Search failed: {}", e))?;
    print_listing(&ctx.repo, &listing, output)
}

pub async fn run_discover(
    media: MediaType,
    genre: Option<i64>,
    sort_by: Option<String>,
    year: Option<i32>,
    page: u32,
    output: &Output,
) -> Result<()> {
    let ctx = AppContext::remote()?;
    let query = DiscoverQuery {
        genre,
        sort_by,
        year,
        page,
    };

    let spinner = Spinner::start(format!("Discovering {} titles...", media));
    let result = ctx.repo.discover(media, &query).await;
    spinner.finish();

    let listing = result.map_err(|e| eyre!("Discover failed: {}", e))?;
    print_listing(&ctx.repo, &media_page_into_multi(listing), output)
}

pub async fn run_browse(
    list: BrowseList,
    target: BrowseTarget,
    window: TimeWindow,
    page: u32,
    output: &Output,
) -> Result<()> {
    let media = target.media_type();
    if media.is_none() && list != BrowseList::Trending {
        return Err(eyre!("'all' is only supported for trending; choose movie or tv"));
    }

    let ctx = AppContext::remote()?;
    let spinner = Spinner::start("Fetching titles from TMDB...");
    let result = match (list, media) {
        (BrowseList::Popular, Some(media)) => ctx.repo.popular(media, page).await.map(media_page_into_multi),
        (BrowseList::TopRated, Some(media)) => ctx.repo.top_rated(media, page).await.map(media_page_into_multi),
        (_, media) => ctx.repo.trending(media, window, page).await,
    };
    spinner.finish();

    let listing = result.map_err(|e| eyre!("Failed to fetch listing: {}", e))?;
    print_listing(&ctx.repo, &listing, output)
}

pub async fn run_genres(media: MediaType, output: &Output) -> Result<()> {
    let ctx = AppContext::remote()?;
    let genres = ctx
        .repo
        .genres(media)
        .await
        .map_err(|e| eyre!("Failed to fetch genres: {}", e))?;

    output.data(&genres);
    if output.is_human() {
        let mut table = ui::table(&["ID", "Genre"]);
        for genre in &genres {
            table.add_row(vec![Cell::new(genre.id), Cell::new(&genre.name)]);
        }
        println!("{}", table);
    }
    Ok(())
}

pub async fn run_show(media: MediaType, id: i64, output: &Output) -> Result<()> {
    let ctx = AppContext::remote()?;
    let key = ItemKey::new(id, media);
    let spinner = Spinner::start(format!("Fetching {}...", key));
    let result = ctx.repo.details(key).await;
    spinner.finish();

    let details = result.map_err(|e| eyre!("Failed to fetch {}: {}", key, e))?;
    let collection = ctx.repo.locate(key)?;

    match &details {
        Details::Movie(m) => output.data(m),
        Details::Tv(t) => output.data(t),
    }
    if !output.is_human() {
        return Ok(());
    }

    println!("\n{}", details.title().bright_cyan().bold());

    let mut table = ui::table(&["Field", "Value"]);
    let (tagline, overview, date, vote, genres, poster, credits, videos) = match &details {
        Details::Movie(m) => (
            m.tagline.clone(),
            m.overview.clone(),
            m.release_date.clone(),
            m.vote_average,
            m.genres.iter().map(|g| g.name.clone()).collect::<Vec<_>>(),
            m.poster_path.clone(),
            m.credits.clone(),
            m.videos.clone(),
        ),
        Details::Tv(t) => (
            t.tagline.clone(),
            t.overview.clone(),
            t.first_air_date.clone(),
            t.vote_average,
            t.genres.iter().map(|g| g.name.clone()).collect::<Vec<_>>(),
            t.poster_path.clone(),
            t.credits.clone(),
            t.videos.clone(),
        ),
    };

    table.add_row(vec![Cell::new("ID"), Cell::new(key.to_string())]);
    if let Some(tagline) = tagline.filter(|t| !t.is_empty()) {
        table.add_row(vec![Cell::new("Tagline"), Cell::new(tagline)]);
    }
    table.add_row(vec![Cell::new("Released"), Cell::new(date.unwrap_or_else(|| "-".to_string()))]);
    table.add_row(vec![Cell::new("Rating"), Cell::new(format!("{:.1}", vote))]);
    table.add_row(vec![Cell::new("Runtime"), Cell::new(ui::format_minutes(details.runtime()))]);
    if let Details::Tv(t) = &details {
        table.add_row(vec![
            Cell::new("Seasons / Episodes"),
            Cell::new(format!(
                "{} / {}",
                t.number_of_seasons.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
                t.number_of_episodes.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
            )),
        ]);
        if let Some(status) = &t.status {
            table.add_row(vec![Cell::new("Status"), Cell::new(status)]);
        }
    }
    table.add_row(vec![Cell::new("Genres"), Cell::new(genres.join(", "))]);
    if let (Some(poster), Some(client)) = (poster, ctx.repo.source()) {
        table.add_row(vec![Cell::new("Poster"), Cell::new(client.image_url(&poster))]);
    }
    if let Some(trailer) = videos.as_ref().and_then(|v| v.trailer()) {
        table.add_row(vec![
            Cell::new("Trailer"),
            Cell::new(format!("https://www.youtube.com/watch?v={}", trailer.key)),
        ]);
    }
    if let Some(credits) = &credits {
        let cast: Vec<String> = credits
            .cast
            .iter()
            .take(5)
            .map(|c| match &c.character {
                Some(character) if !character.is_empty() => format!("{} ({})", c.name, character),
                _ => c.name.clone(),
            })
            .collect();
        if !cast.is_empty() {
            table.add_row(vec![Cell::new("Cast"), Cell::new(cast.join("\n"))]);
        }
    }
    table.add_row(vec![
        Cell::new("In library"),
        Cell::new(match collection {
            Some(c) => collection_label(Some(c)),
            None => "no".bright_black().to_string(),
        }),
    ]);
    println!("{}", table);

    if let Some(overview) = overview.filter(|o| !o.is_empty()) {
        println!("\n{}\n", overview);
    }

    let (similar, recommended): (Vec<String>, Vec<String>) = match &details {
        Details::Movie(m) => (
            m.similar.iter().flat_map(|p| &p.results).take(5).map(|s| format!("{} (movie:{})", s.title, s.id)).collect(),
            m.recommendations.iter().flat_map(|p| &p.results).take(5).map(|s| format!("{} (movie:{})", s.title, s.id)).collect(),
        ),
        Details::Tv(t) => (
            t.similar.iter().flat_map(|p| &p.results).take(5).map(|s| format!("{} (tv:{})", s.name, s.id)).collect(),
            t.recommendations.iter().flat_map(|p| &p.results).take(5).map(|s| format!("{} (tv:{})", s.name, s.id)).collect(),
        ),
    };
    if !similar.is_empty() {
        println!("{} {}", "Similar:".bold(), similar.join(", "));
    }
    if !recommended.is_empty() {
        println!("{} {}", "Recommended:".bold(), recommended.join(", "));
    }
    Ok(())
}
