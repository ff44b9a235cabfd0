use anyhow::{Context, Result};
use melodex_core::{ScoreBreakdown, Scorer};
use std::path::PathBuf;

use super::weights::{case_variant_of, load_weights};

/// Print the score breakdown for a single observation.
pub fn show_score(
    source: &str,
    rank: u32,
    age_hours: Option<f64>,
    source_count: u32,
    weights_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let scorer = Scorer::new(load_weights(weights_path.as_deref())?);
    if let Some(known) = case_variant_of(&scorer, source) {
        log::warn!(
            "Source {:?} is not in the weight table and scores with the default weight; did you mean {}?",
            source,
            known
        );
    }
    let breakdown = scorer.breakdown_with_age(source, rank, age_hours, source_count);

    if json {
        let rendered =
            serde_json::to_string_pretty(&breakdown).context("Failed to serialize breakdown")?;
        println!("{rendered}");
    } else {
        print!("{}", render_breakdown(source, &breakdown));
    }

    Ok(())
}

fn render_breakdown(source: &str, b: &ScoreBreakdown) -> String {
    format!(
        "Score for {source}\n\
         \n  source weight:   {:.3}\
         \n  normalized rank: {:.3}\
         \n  base:            {:.3}\
         \n  freshness:       {:.3}\
         \n  cross-source:    {:.3}\
         \n  total:           {:.3}\n",
        b.source_weight, b.normalized_rank, b.base, b.freshness, b.cross_source, b.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_breakdown() {
        let scorer = Scorer::default();
        let breakdown = scorer.breakdown_with_age("hnhh", 1, Some(2.0), 2);
        let rendered = render_breakdown("hnhh", &breakdown);

        assert!(rendered.starts_with("Score for hnhh"));
        assert!(rendered.contains("source weight:   0.700"));
        assert!(rendered.contains("freshness:       0.200"));
        assert!(rendered.contains("total:           1.000"));
    }
}
