//! Composite discovery score.
//!
//! ```text
//! score = weight(source) * normalized_rank + freshness_bonus + cross_source_bonus
//! ```
//!
//! The score is deliberately unclamped: a top-ranked track from a heavily
//! weighted source that is both fresh and corroborated can exceed 1.0.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::RankedTrack;
use crate::weights::SourceWeights;

/// Number of chart positions mapped onto the `1.0..0.0` rank range.
const RANK_SPAN: f64 = 100.0;

/// Bonus for observations younger than [`FRESH_HOURS`].
pub const MAX_FRESHNESS_BONUS: f64 = 0.2;

/// Age below which an observation gets the full freshness bonus.
pub const FRESH_HOURS: f64 = 24.0;

/// Age at which the freshness bonus reaches zero (one week).
pub const STALE_HOURS: f64 = 168.0;

/// Bonus per additional corroborating source.
pub const CROSS_SOURCE_STEP: f64 = 0.1;

/// Cap on the cross-source bonus; reached at four sources.
pub const MAX_CROSS_SOURCE_BONUS: f64 = 0.3;

/// Map a chart rank onto `[0, 1]`: rank 1 is 1.0, rank 101 and beyond is 0.
pub fn normalized_rank(rank: u32) -> f64 {
    let normalized = 1.0 - (f64::from(rank) - 1.0) / RANK_SPAN;
    normalized.clamp(0.0, 1.0)
}

/// Freshness bonus for an observation of the given age in hours.
///
/// Unknown age earns nothing. Ages under a day earn the full bonus, which
/// then decays linearly to zero over the rest of the week.
pub fn freshness_bonus(age_hours: Option<f64>) -> f64 {
    let Some(age) = age_hours.filter(|a| !a.is_nan()) else {
        return 0.0;
    };

    if age < FRESH_HOURS {
        MAX_FRESHNESS_BONUS
    } else if age < STALE_HOURS {
        MAX_FRESHNESS_BONUS * (1.0 - (age - FRESH_HOURS) / (STALE_HOURS - FRESH_HOURS))
    } else {
        0.0
    }
}

/// Bonus for a record corroborated by `source_count` observations.
pub fn cross_source_bonus(source_count: u32) -> f64 {
    (f64::from(source_count.saturating_sub(1)) * CROSS_SOURCE_STEP).min(MAX_CROSS_SOURCE_BONUS)
}

/// Age of `created_at` relative to `now`, in hours.
///
/// Timestamps in the future yield a negative age, which counts as fresh.
pub fn age_hours(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<f64> {
    created_at.map(|t| (now - t).num_milliseconds() as f64 / 3_600_000.0)
}

/// Every component of a computed score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub source_weight: f64,
    pub normalized_rank: f64,
    pub base: f64,
    pub freshness: f64,
    pub cross_source: f64,
    pub total: f64,
}

/// Scores track records against an injected source-weight table.
///
/// The scorer holds no mutable state and can be shared freely across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: SourceWeights,
}

impl Scorer {
    #[must_use]
    pub fn new(weights: SourceWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &SourceWeights {
        &self.weights
    }

    /// Weight of a single source identifier; unknown sources get the fallback.
    pub fn source_weight(&self, source: &str) -> f64 {
        self.weights.weight_for(source)
    }

    /// Score a record using the current time for freshness.
    pub fn score(&self, track: &RankedTrack) -> f64 {
        self.score_at(track, Utc::now())
    }

    /// Score a record against an explicit reference time.
    pub fn score_at(&self, track: &RankedTrack, now: DateTime<Utc>) -> f64 {
        self.breakdown_at(track, now).total
    }

    /// Score a record and return each component.
    ///
    /// The weight is looked up with the record's primary source, so a merged
    /// record is weighted by its representative rather than by the joined
    /// source list.
    pub fn breakdown_at(&self, track: &RankedTrack, now: DateTime<Utc>) -> ScoreBreakdown {
        self.breakdown_for(
            track.weight_key(),
            track.rank,
            track.created_at,
            track.source_count,
            now,
        )
    }

    /// Score raw inputs without building a record.
    pub fn breakdown_for(
        &self,
        source: &str,
        rank: u32,
        created_at: Option<DateTime<Utc>>,
        source_count: u32,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        self.breakdown_with_age(source, rank, age_hours(created_at, now), source_count)
    }

    /// Score raw inputs with the observation age already known, in hours.
    pub fn breakdown_with_age(
        &self,
        source: &str,
        rank: u32,
        age_hours: Option<f64>,
        source_count: u32,
    ) -> ScoreBreakdown {
        let source_weight = self.source_weight(source);
        let normalized_rank = normalized_rank(rank);
        let base = source_weight * normalized_rank;
        let freshness = freshness_bonus(age_hours);
        let cross_source = cross_source_bonus(source_count);

        ScoreBreakdown {
            source_weight,
            normalized_rank,
            base,
            freshness,
            cross_source,
            total: base + freshness + cross_source,
        }
    }
}
