use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::observation::{TrackMetadata, TrackObservation};

/// A scored, possibly merged, entry of the discovery list.
///
/// Records are built by the ranker and not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTrack {
    pub artist: String,
    pub title: String,

    /// Comma-joined list of every contributing source when `source_count > 1`.
    pub source: String,

    /// The representative observation's own source; used for the weight lookup.
    #[serde(default)]
    pub primary_source: String,

    pub rank: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_on_chart: Option<u32>,

    #[serde(flatten)]
    pub metadata: TrackMetadata,

    pub score: f64,

    pub source_count: u32,
}

impl RankedTrack {
    /// Wrap a single observation as an unscored, single-source record.
    #[must_use]
    pub fn from_observation(observation: TrackObservation) -> Self {
        Self {
            artist: observation.artist,
            title: observation.title,
            primary_source: observation.source.clone(),
            source: observation.source,
            rank: observation.rank,
            created_at: observation.created_at,
            weeks_on_chart: observation.weeks_on_chart,
            metadata: observation.metadata,
            score: 0.0,
            source_count: 1,
        }
    }

    /// The key used to look up this record's source weight.
    ///
    /// Falls back to `source` for records deserialized without a primary
    /// source.
    pub fn weight_key(&self) -> &str {
        if self.primary_source.is_empty() {
            &self.source
        } else {
            &self.primary_source
        }
    }

    /// Iterate over the individual contributing sources.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.source.split(',')
    }

    pub fn is_merged(&self) -> bool {
        self.source_count > 1
    }
}

impl From<TrackObservation> for RankedTrack {
    fn from(observation: TrackObservation) -> Self {
        Self::from_observation(observation)
    }
}
