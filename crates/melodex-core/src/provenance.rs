use std::fmt;

use serde::{Deserialize, Serialize};

/// The sources melodex ships default weights for.
///
/// Observations are not restricted to these; any source string is accepted
/// and unknown ones score with the fallback weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownSource {
    /// Spotify's curated new-release feed.
    #[serde(rename = "spotify_new_releases")]
    SpotifyNewReleases,
    /// The r/hiphopheads "FRESH" posts.
    #[serde(rename = "reddit_fresh")]
    RedditFresh,
    /// HotNewHipHop's top songs list.
    #[serde(rename = "hnhh")]
    HotNewHipHop,
    /// Pitchfork's Best New Music.
    #[serde(rename = "pitchfork_bnm")]
    PitchforkBestNew,
    /// The Billboard Hot 100.
    #[serde(rename = "billboard")]
    Billboard,
}

/// Canonical identifiers and default weights, from freshest to most
/// long-running signal.
const SOURCE_TABLE: &[(KnownSource, &str, f64)] = &[
    (KnownSource::SpotifyNewReleases, "spotify_new_releases", 1.0),
    (KnownSource::RedditFresh, "reddit_fresh", 0.9),
    (KnownSource::HotNewHipHop, "hnhh", 0.7),
    (KnownSource::PitchforkBestNew, "pitchfork_bnm", 0.6),
    (KnownSource::Billboard, "billboard", 0.5),
];

impl KnownSource {
    /// Every known source, in descending default weight.
    pub const ALL: [Self; 5] = [
        Self::SpotifyNewReleases,
        Self::RedditFresh,
        Self::HotNewHipHop,
        Self::PitchforkBestNew,
        Self::Billboard,
    ];

    /// The identifier scrapers tag observations with.
    pub fn name(self) -> &'static str {
        SOURCE_TABLE
            .iter()
            .find(|(s, _, _)| *s == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("unknown")
    }

    pub fn default_weight(self) -> f64 {
        SOURCE_TABLE
            .iter()
            .find(|(s, _, _)| *s == self)
            .map(|(_, _, weight)| *weight)
            .unwrap_or(0.0)
    }

    /// Parse a source identifier (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        SOURCE_TABLE
            .iter()
            .find(|(_, canonical, _)| canonical.eq_ignore_ascii_case(name.trim()))
            .map(|(s, _, _)| *s)
    }
}

impl fmt::Display for KnownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
