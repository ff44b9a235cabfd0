use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Enrichment identifiers attached to a track.
///
/// Each field is independently present or absent. An empty string is treated
/// the same as an absent value when merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// `MusicBrainz` recording ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,

    #[serde(rename = "spotifyID", default, skip_serializing_if = "Option::is_none")]
    pub spotify_id: Option<String>,

    /// Thumbnail image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

impl TrackMetadata {
    /// Copy every field that is empty here and populated in `other`.
    ///
    /// Fields that already hold a non-empty value are never overwritten.
    pub fn fill_from(&mut self, other: &Self) {
        fill_slot(&mut self.mbid, other.mbid.as_deref());
        fill_slot(&mut self.isrc, other.isrc.as_deref());
        fill_slot(&mut self.spotify_id, other.spotify_id.as_deref());
        fill_slot(&mut self.thumb, other.thumb.as_deref());
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

fn fill_slot(slot: &mut Option<String>, candidate: Option<&str>) {
    if !is_blank(slot.as_deref()) {
        return;
    }
    if let Some(value) = candidate.filter(|v| !v.is_empty()) {
        *slot = Some(value.to_string());
    }
}

/// One source's report of one track on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackObservation {
    pub artist: String,
    pub title: String,

    /// Provenance tag (chart or feed name). Drives the scoring weight.
    pub source: String,

    /// Position within the source's list for that day; 1 is best.
    pub rank: u32,

    /// When the observation was produced. Absent means unknown age.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Chart longevity as reported by chart sources. Not scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_on_chart: Option<u32>,

    #[serde(flatten)]
    pub metadata: TrackMetadata,
}

impl TrackObservation {
    #[must_use]
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        rank: u32,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            source: source.into(),
            rank,
            created_at: None,
            weeks_on_chart: None,
            metadata: TrackMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn with_weeks_on_chart(mut self, weeks: u32) -> Self {
        self.weeks_on_chart = Some(weeks);
        self
    }

    #[must_use]
    pub fn with_mbid(mut self, mbid: impl Into<String>) -> Self {
        self.metadata.mbid = Some(mbid.into());
        self
    }

    #[must_use]
    pub fn with_isrc(mut self, isrc: impl Into<String>) -> Self {
        self.metadata.isrc = Some(isrc.into());
        self
    }

    #[must_use]
    pub fn with_spotify_id(mut self, spotify_id: impl Into<String>) -> Self {
        self.metadata.spotify_id = Some(spotify_id.into());
        self
    }

    #[must_use]
    pub fn with_thumb(mut self, thumb: impl Into<String>) -> Self {
        self.metadata.thumb = Some(thumb.into());
        self
    }

    /// Describe why this observation breaks the caller contract, if it does.
    pub fn validation_error(&self) -> Option<&'static str> {
        if self.artist.trim().is_empty() {
            Some("artist is empty")
        } else if self.title.trim().is_empty() {
            Some("title is empty")
        } else if self.source.trim().is_empty() {
            Some("source is empty")
        } else if self.rank == 0 {
            Some("rank must be at least 1")
        } else {
            None
        }
    }
}

/// Reject a batch at the boundary, reporting the first offending record.
///
/// The ranker itself never validates; callers run this before handing a
/// batch over.
pub fn validate_observations(observations: &[TrackObservation]) -> Result<()> {
    for (index, observation) in observations.iter().enumerate() {
        if let Some(reason) = observation.validation_error() {
            return Err(Error::InvalidObservation {
                index,
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}
