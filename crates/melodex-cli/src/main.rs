use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;

use commands::rank::{OutputFormat, RankArgs};
use config::Config;

#[derive(Debug, Parser)]
#[command(name = "melodex", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Rank and deduplicate a batch of track observations
    ///
    /// Reads a JSON array of observations, one per source report, each with
    /// `artist`, `title`, `source` and `rank` and optionally `createdAt`,
    /// `mbid`, `isrc`, `spotifyID`, `thumb` and `weeksOnChart`.
    ///
    /// Observations of the same track are merged across sources: case,
    /// whitespace, punctuation and featured-artist credits are ignored when
    /// matching. Each merged track carries every contributing source and a
    /// cross-source bonus. Output is sorted by score, highest first.
    ///
    /// Records with an empty artist, title or source, or a rank of 0, are
    /// rejected unless --skip-invalid is given.
    Rank {
        /// Observations JSON file, or '-' for stdin (default: stdin)
        input: Option<PathBuf>,

        /// Source weight table (TOML)
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Print at most this many tracks
        #[arg(long)]
        limit: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Drop invalid observations with a warning instead of failing
        #[arg(long)]
        skip_invalid: bool,

        /// Reference time for freshness, RFC 3339 (default: now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Show the score breakdown for a single observation
    Score {
        /// Source identifier
        #[arg(long)]
        source: String,

        /// Chart position (1 = best)
        #[arg(long)]
        rank: u32,

        /// Observation age in hours (omit for unknown age)
        #[arg(long)]
        age_hours: Option<f64>,

        /// Number of sources reporting the track
        #[arg(long, default_value_t = 1)]
        source_count: u32,

        /// Source weight table (TOML)
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the identity key used to match an artist/title pair
    Key {
        artist: String,
        title: String,
    },
    /// Manage the source weight table
    Weights {
        #[command(subcommand)]
        action: WeightsAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum WeightsAction {
    /// Write the built-in weight table to the default location
    Init,
    /// Show the weight table file path
    Path,
    /// Show the effective weight table
    Show,
    /// Validate the weight table file
    Validate,
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show the config file path
    Path,
    /// Create the config file with defaults
    Init,
    /// Print an example config file
    Example,
}

fn init_logging(opts: twyg::Opts) -> Result<()> {
    twyg::setup(opts).map_err(|e| anyhow::anyhow!("Failed to set up logging: {e:?}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    init_logging(config.logging.clone())?;

    match cli.command {
        Commands::Rank {
            input,
            weights,
            limit,
            format,
            skip_invalid,
            now,
        } => {
            let args = RankArgs {
                input,
                weights,
                limit,
                format,
                skip_invalid,
                now,
            };
            commands::run_rank(&args, &config)?;
        }
        Commands::Score {
            source,
            rank,
            age_hours,
            source_count,
            weights,
            json,
        } => {
            let weights = weights.or_else(|| config.effective_weights_path());
            commands::show_score(&source, rank, age_hours, source_count, weights, json)?;
        }
        Commands::Key { artist, title } => {
            commands::show_key(&artist, &title);
        }
        Commands::Weights { action } => match action {
            WeightsAction::Init => commands::weights::init_weights()?,
            WeightsAction::Path => commands::weights::show_path(&config),
            WeightsAction::Show => commands::weights::show_weights(&config)?,
            WeightsAction::Validate => commands::weights::validate_weights(&config)?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Init => commands::config::init_config()?,
            ConfigAction::Example => commands::config::show_example(),
        },
    }

    Ok(())
}
