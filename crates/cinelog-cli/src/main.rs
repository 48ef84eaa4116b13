use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use cinelog_config::PathManager;
use cinelog_models::MediaType;
use cinelog_tmdb::TimeWindow;
use commands::{backup, catalog, config, library, maintenance};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "cinelog")]
#[command(about = "cinelog - Track the movies and shows you watch, using TMDB")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaArg {
    Movie,
    Tv,
}

impl From<MediaArg> for MediaType {
    fn from(arg: MediaArg) -> Self {
        match arg {
            MediaArg::Movie => MediaType::Movie,
            MediaArg::Tv => MediaType::Tv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrowseList {
    Popular,
    TopRated,
    Trending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrowseTarget {
    Movie,
    Tv,
    All,
}

impl BrowseTarget {
    pub fn media_type(self) -> Option<MediaType> {
        match self {
            BrowseTarget::Movie => Some(MediaType::Movie),
            BrowseTarget::Tv => Some(MediaType::Tv),
            BrowseTarget::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WindowArg {
    Day,
    Week,
}

impl From<WindowArg> for TimeWindow {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Day => TimeWindow::Day,
            WindowArg::Week => TimeWindow::Week,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search TMDB for movies, shows and people
    #[command(long_about = "Search TMDB. Without flags, searches movies, TV shows and people together; use --movies or --tv to narrow the search.")]
    Search {
        /// Search text
        query: String,

        /// Only search movies
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "tv")]
        movies: bool,

        /// Only search TV shows
        #[arg(long, action = ArgAction::SetTrue)]
        tv: bool,

        /// Result page
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Discover titles by genre, year and sort order
    Discover {
        media: MediaArg,

        /// Genre id (see `cinelog genres`)
        #[arg(long)]
        genre: Option<i64>,

        /// TMDB sort order, e.g. popularity.desc or vote_average.desc
        #[arg(long)]
        sort_by: Option<String>,

        /// Release (movies) or first-air (TV) year
        #[arg(long)]
        year: Option<i32>,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Browse popular, top-rated or trending titles
    Browse {
        list: BrowseList,

        /// `all` is only valid for trending
        #[arg(default_value = "movie")]
        target: BrowseTarget,

        /// Trending window
        #[arg(long, default_value = "week")]
        window: WindowArg,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show details of a movie or show
    #[command(long_about = "Show full TMDB details for a title, including cast, trailer, similar titles and recommendations, and which of your lists it is on.")]
    Show { media: MediaArg, id: i64 },
    /// List TMDB genres
    Genres { media: MediaArg },
    /// Titles you have finished
    Watched {
        #[command(subcommand)]
        cmd: WatchedCommands,
    },
    /// Titles you plan to watch
    Planned {
        #[command(subcommand)]
        cmd: PlannedCommands,
    },
    /// Titles in progress
    Watching {
        #[command(subcommand)]
        cmd: WatchingCommands,
    },
    /// Library statistics
    Stats,
    /// Create, list, export and restore backups
    #[command(long_about = "Manage JSON backups of your library. Backups are written to the backup directory (see `cinelog config show`). Restoring replaces the whole library.")]
    Backup {
        #[command(subcommand)]
        cmd: BackupCommands,
    },
    /// Library maintenance
    Maintenance {
        #[command(subcommand)]
        cmd: MaintenanceCommands,
    },
    /// Configure credentials and settings
    #[command(long_about = "View or change configuration. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum WatchedCommands {
    /// Mark a title as watched (again)
    Add {
        media: MediaArg,
        id: i64,

        /// Your rating, 0-10
        #[arg(long)]
        rating: Option<f64>,
    },
    /// List watched titles, most recent first
    List,
    /// Remove a title from the watched list
    Remove { media: MediaArg, id: i64 },
}

#[derive(Subcommand)]
pub enum PlannedCommands {
    /// Add a title to the plan-to-watch list
    Add { media: MediaArg, id: i64 },
    /// List planned titles, most recently added first
    List,
    /// Remove a title from the planned list
    Remove { media: MediaArg, id: i64 },
}

#[derive(Subcommand)]
pub enum WatchingCommands {
    /// Start watching a title (moves it off the planned list)
    Add { media: MediaArg, id: i64 },
    /// List titles in progress
    List,
    /// Stop tracking a title in progress
    Remove { media: MediaArg, id: i64 },
    /// Set the current season and episode
    Progress {
        media: MediaArg,
        id: i64,

        #[arg(long)]
        season: i32,

        #[arg(long)]
        episode: i32,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Write a timestamped backup to the backup directory
    Create,
    /// List backups, newest first
    List,
    /// Delete a backup by file name
    Delete { name: String },
    /// Export a backup to a file, or `-` for stdout
    Export { path: String },
    /// Replace the library with the contents of a backup
    Restore {
        path: std::path::PathBuf,

        /// Skip the confirmation prompt
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum MaintenanceCommands {
    /// Compute runtimes for watched shows stored without one
    FixRuntimes,
    /// Run maintenance on a schedule
    #[command(long_about = "Run library maintenance periodically according to the configured cron schedule (6 fields, seconds first, evaluated in UTC). Runs once on startup unless --no-startup-run is given. Logs go to the log directory.")]
    Daemon {
        /// Cron schedule expression (e.g. '0 0 4 * * *' for daily at 04:00)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the run on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks secrets)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store TMDB credentials
    #[command(long_about = "Store a TMDB v4 read access token or a v3 API key. Without flags, prompts for an access token. Create one at https://www.themoviedb.org/settings/api.")]
    Tmdb {
        /// TMDB v3 API key
        #[arg(long, conflicts_with = "access_token")]
        api_key: Option<String>,

        /// TMDB v4 read access token
        #[arg(long)]
        access_token: Option<String>,
    },
    /// Display preferences
    Display {
        /// system, light or dark
        #[arg(long)]
        theme: Option<String>,

        /// Locale sent to TMDB as the response language, e.g. en-US
        #[arg(long)]
        locale: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The daemon logs to a rotating file; everything else logs to stderr
    if let Commands::Maintenance {
        cmd: MaintenanceCommands::Daemon { .. },
    } = &cli.command
    {
        let log_file = PathManager::default().daemon_log_file();
        logging::init_logging_with_file(cli.verbose, cli.quiet, &log_file)
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    } else {
        logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    }

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query, movies, tv, page } => catalog::run_search(&query, movies, tv, page, &output).await,
        Commands::Discover {
            media,
            genre,
            sort_by,
            year,
            page,
        } => catalog::run_discover(media.into(), genre, sort_by, year, page, &output).await,
        Commands::Browse {
            list,
            target,
            window,
            page,
        } => catalog::run_browse(list, target, window.into(), page, &output).await,
        Commands::Show { media, id } => catalog::run_show(media.into(), id, &output).await,
        Commands::Genres { media } => catalog::run_genres(media.into(), &output).await,
        Commands::Watched { cmd } => library::run_watched(cmd, &output).await,
        Commands::Planned { cmd } => library::run_planned(cmd, &output).await,
        Commands::Watching { cmd } => library::run_watching(cmd, &output).await,
        Commands::Stats => library::run_stats(&output),
        Commands::Backup { cmd } => backup::run_backup(cmd, &output),
        Commands::Maintenance { cmd } => maintenance::run_maintenance(cmd, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output)
        }
    }
}
