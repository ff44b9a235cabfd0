use anyhow::{Context, Result};
use melodex_core::{KnownSource, Scorer, SourceWeights};
use std::fs;
use std::path::Path;

use crate::config::{self, Config};

/// The commented default table written by `melodex weights init`.
const DEFAULT_WEIGHTS_FILE: &str = include_str!("../../../../config/weights.toml");

/// Load the weight table at `path`, or the built-in table when there is none.
pub fn load_weights(path: Option<&Path>) -> Result<SourceWeights> {
    match path {
        Some(path) => {
            let weights = SourceWeights::load(path)
                .with_context(|| format!("Failed to load weights from {}", path.display()))?;
            log::info!(
                "Loaded {} source weights from {}",
                weights.len(),
                path.display()
            );
            Ok(weights)
        }
        None => {
            log::debug!("Using built-in source weights");
            Ok(SourceWeights::default())
        }
    }
}

/// The known source a scorer would have matched if `source` were spelled in
/// its canonical case.
///
/// Weight lookup is exact, so `"Billboard"` scores with the fallback weight.
pub fn case_variant_of(scorer: &Scorer, source: &str) -> Option<KnownSource> {
    let weights = scorer.weights();
    if weights.is_known(source) {
        return None;
    }
    KnownSource::parse(source).filter(|known| weights.is_known(known.name()))
}

/// Render a weight table as a commented TOML file.
fn render_weights_file(weights: &SourceWeights) -> Result<String> {
    let body = weights
        .to_toml_string()
        .context("Failed to render weight table")?;
    Ok(format!(
        "# Melodex Source Weights\n\
         #\n\
         # Each weight in [0, 1] scales a source's normalized chart rank.\n\
         # Sources missing from [weights] score with default_weight.\n\n{body}"
    ))
}

/// Write the built-in weight table to the default location.
pub fn init_weights() -> Result<()> {
    let weights_path = config::default_weights_path();

    if weights_path.exists() {
        println!("✓ Weights file already exists at: {}", weights_path.display());
        return Ok(());
    }

    if let Some(parent) = weights_path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(&weights_path, DEFAULT_WEIGHTS_FILE).context("Failed to write weights file")?;

    println!("✓ Created default weights file at: {}", weights_path.display());
    println!("\nNext steps:");
    println!("  1. Adjust the weights or add new sources");
    println!("  2. Validate syntax: melodex weights validate");

    Ok(())
}

/// Show the weight table file path.
pub fn show_path(config: &Config) {
    match config.effective_weights_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            println!("<built-in>");
            println!(
                "\nRun 'melodex weights init' to create {}",
                config::default_weights_path().display()
            );
        }
    }
}

/// Print the effective weight table as TOML.
pub fn show_weights(config: &Config) -> Result<()> {
    let path = config.effective_weights_path();
    let weights = load_weights(path.as_deref())?;
    print!("{}", render_weights_file(&weights)?);
    Ok(())
}

/// Validate the weight table file.
pub fn validate_weights(config: &Config) -> Result<()> {
    let weights_path = config
        .effective_weights_path()
        .unwrap_or_else(config::default_weights_path);

    if !weights_path.exists() {
        println!("Weights file not found: {}", weights_path.display());
        println!("\nRun 'melodex weights init' to create it first.");
        return Ok(());
    }

    match SourceWeights::load(&weights_path) {
        Ok(weights) => {
            let unlisted: Vec<&str> = KnownSource::ALL
                .iter()
                .map(|s| s.name())
                .filter(|name| !weights.is_known(name))
                .collect();

            println!("✓ Weights file is valid!");
            println!("\nSummary:");
            println!("  Sources:        {}", weights.len());
            println!("  Default weight: {}", weights.default_weight);
            if !unlisted.is_empty() {
                println!("  Using default:  {}", unlisted.join(", "));
            }
        }
        Err(e) => {
            println!("✗ Weights file has errors:");
            println!("\n{}", e);
            println!("\nFix the errors and run 'melodex weights validate' again.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_weights_defaults_to_built_in() {
        let weights = load_weights(None).unwrap();
        assert_eq!(weights, SourceWeights::default());
    }

    #[test]
    fn test_load_weights_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.toml");
        fs::write(&path, "[weights]\nhypem = 0.75\n").unwrap();

        let weights = load_weights(Some(&path)).unwrap();
        assert!((weights.weight_for("hypem") - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_weights_reports_path() {
        let err = load_weights(Some(Path::new("/nonexistent/weights.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/weights.toml"));
    }

    #[test]
    fn test_default_weights_file_matches_built_in() {
        assert!(DEFAULT_WEIGHTS_FILE.contains("melodex weights init"));
        let parsed = SourceWeights::from_toml_str(DEFAULT_WEIGHTS_FILE).unwrap();
        assert_eq!(parsed, SourceWeights::default());
    }

    #[test]
    fn test_case_variant_of() {
        let scorer = Scorer::default();
        assert_eq!(
            case_variant_of(&scorer, "BILLBOARD"),
            Some(KnownSource::Billboard)
        );
        assert_eq!(
            case_variant_of(&scorer, "Spotify_New_Releases"),
            Some(KnownSource::SpotifyNewReleases)
        );
        assert_eq!(case_variant_of(&scorer, "billboard"), None);
        assert_eq!(case_variant_of(&scorer, "hypem"), None);

        let custom = Scorer::new(SourceWeights::empty(0.3).with_weight("hypem", 0.8));
        assert_eq!(case_variant_of(&custom, "HNHH"), None);
    }

    #[test]
    fn test_rendered_file_loads_back() {
        let rendered = render_weights_file(&SourceWeights::default()).unwrap();
        assert!(rendered.starts_with("# Melodex Source Weights"));
        let parsed = SourceWeights::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed, SourceWeights::default());
    }
}
