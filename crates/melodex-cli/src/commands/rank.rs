use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use melodex_core::{
    rank_and_deduplicate_at, validate_observations, RankedTrack, Scorer, TrackObservation,
};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::weights::{case_variant_of, load_weights};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug)]
pub struct RankArgs {
    pub input: Option<PathBuf>,
    pub weights: Option<PathBuf>,
    pub limit: Option<usize>,
    pub format: OutputFormat,
    pub skip_invalid: bool,
    pub now: Option<DateTime<Utc>>,
}

pub fn run_rank(args: &RankArgs, config: &Config) -> Result<()> {
    let input = read_input(args.input.as_deref())?;

    let weights_path = args
        .weights
        .clone()
        .or_else(|| config.effective_weights_path());
    let scorer = Scorer::new(load_weights(weights_path.as_deref())?);
    let now = args.now.unwrap_or_else(Utc::now);

    let mut ranked = rank_document(&input, &scorer, now, args.skip_invalid)?;

    if let Some(limit) = args.limit.or(config.limit) {
        ranked.truncate(limit);
    }

    match args.format {
        OutputFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(&ranked).context("Failed to serialize ranking")?;
            println!("{rendered}");
        }
        OutputFormat::Table => print!("{}", render_table(&ranked)),
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read observations from {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read observations from stdin")?;
            Ok(buffer)
        }
    }
}

/// Parse a JSON array of observations, check them, and rank them.
pub fn rank_document(
    input: &str,
    scorer: &Scorer,
    now: DateTime<Utc>,
    skip_invalid: bool,
) -> Result<Vec<RankedTrack>> {
    let mut observations: Vec<TrackObservation> =
        serde_json::from_str(input).context("Failed to parse observations JSON")?;

    if skip_invalid {
        let before = observations.len();
        observations.retain(|o| match o.validation_error() {
            Some(reason) => {
                log::warn!(
                    "Skipping observation {:?} - {:?} from {:?}: {}",
                    o.artist,
                    o.title,
                    o.source,
                    reason
                );
                false
            }
            None => true,
        });
        if observations.len() < before {
            log::warn!(
                "Skipped {} invalid observations",
                before - observations.len()
            );
        }
    } else {
        validate_observations(&observations).context("Rejected observation batch")?;
    }

    let sources: BTreeSet<&str> = observations.iter().map(|o| o.source.as_str()).collect();
    for source in sources {
        if let Some(known) = case_variant_of(scorer, source) {
            log::warn!(
                "Source {:?} is not in the weight table and scores with the default weight; did you mean {}?",
                source,
                known
            );
        }
    }

    Ok(rank_and_deduplicate_at(scorer, observations, now))
}

/// Render ranked tracks as a plain-text table.
pub fn render_table(ranked: &[RankedTrack]) -> String {
    let header = format!(
        "{:>4}  {:>6}  {:<28}  {:<36}  {}",
        "#", "score", "artist", "title", "sources"
    );
    let rows = ranked.iter().enumerate().map(|(position, track)| {
        format!(
            "{:>4}  {:>6.3}  {:<28}  {:<36}  {}",
            position + 1,
            track.score,
            truncate(&track.artist, 28),
            truncate(&track.title, 36),
            track.sources().collect::<Vec<_>>().join(", ")
        )
    });

    std::iter::once(header)
        .chain(rows)
        .map(|line| line + "\n")
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
