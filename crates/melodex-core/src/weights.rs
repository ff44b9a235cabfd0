//! Source weight table for the scorer.
//!
//! A weight in `[0, 1]` expresses how authoritative and fresh a source's
//! signal is. The table is read-only configuration injected into the
//! [`Scorer`](crate::scoring::Scorer); it can be the built-in default or be
//! loaded from a TOML file of the form:
//!
//! ```toml
//! default_weight = 0.3
//!
//! [weights]
//! spotify_new_releases = 1.0
//! billboard = 0.5
//! ```
//!
//! # Example
//!
//! ```
//! use melodex_core::SourceWeights;
//!
//! let weights = SourceWeights::default();
//! assert_eq!(weights.weight_for("spotify_new_releases"), 1.0);
//! assert_eq!(weights.weight_for("some_new_blog"), 0.3);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::provenance::KnownSource;

/// Weight applied to sources missing from the table.
pub const FALLBACK_WEIGHT: f64 = 0.3;

/// Mapping from source identifier to scoring weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceWeights {
    /// Weight for sources not listed in `weights`.
    #[serde(default = "default_fallback_weight")]
    pub default_weight: f64,

    /// Source identifier to weight.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

fn default_fallback_weight() -> f64 {
    FALLBACK_WEIGHT
}

impl Default for SourceWeights {
    fn default() -> Self {
        let weights = KnownSource::ALL
            .iter()
            .map(|s| (s.name().to_string(), s.default_weight()))
            .collect();
        Self {
            default_weight: FALLBACK_WEIGHT,
            weights,
        }
    }
}

impl SourceWeights {
    /// An empty table where every source scores with `default_weight`.
    #[must_use]
    pub fn empty(default_weight: f64) -> Self {
        Self {
            default_weight,
            weights: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_weight(mut self, source: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(source.into(), weight);
        self
    }

    /// Load a weight table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, cannot be parsed, or
    /// holds a weight outside `[0, 1]`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_toml_str(&content).map_err(|e| {
            Error::InvalidData(format!(
                "failed to load source weights from {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse and validate a weight table from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let weights: Self =
            toml::from_str(content).map_err(|e| Error::InvalidData(e.to_string()))?;
        weights.validate()?;
        Ok(weights)
    }

    /// Render the table as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::InvalidData(e.to_string()))
    }

    /// Check every weight, including the fallback, is finite and in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        check_weight("default_weight", self.default_weight)?;
        for (source, &weight) in &self.weights {
            if source.trim().is_empty() {
                return Err(Error::InvalidData(
                    "source weight table contains an empty source name".to_string(),
                ));
            }
            check_weight(source, weight)?;
        }
        Ok(())
    }

    /// Get the weight for a source identifier.
    ///
    /// Identifiers match exactly, so `"Billboard"` is not `"billboard"`.
    /// Unknown sources get `default_weight`. Entries that bypassed
    /// [`validate`](Self::validate) are clamped into `[0, 1]`, and a
    /// non-finite entry counts as missing, so the result is always usable.
    pub fn weight_for(&self, source: &str) -> f64 {
        self.lookup(source)
            .unwrap_or_else(|| usable_weight(self.default_weight).unwrap_or(FALLBACK_WEIGHT))
    }

    /// Returns `true` when the source has an explicit entry.
    pub fn is_known(&self, source: &str) -> bool {
        self.weights.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn lookup(&self, source: &str) -> Option<f64> {
        self.weights.get(source).copied().and_then(usable_weight)
    }
}

fn usable_weight(weight: f64) -> Option<f64> {
    weight.is_finite().then(|| weight.clamp(0.0, 1.0))
}

fn check_weight(name: &str, weight: f64) -> Result<()> {
    if weight.is_finite() && (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "weight for {name} must be within [0, 1], got {weight}"
        )))
    }
}
