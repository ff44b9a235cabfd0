//! Group observations by identity, merge each group, score and sort.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::identity::identity_key;
use crate::model::{RankedTrack, TrackObservation};
use crate::scoring::Scorer;

/// Separator used when joining the sources of a merged record.
pub const SOURCE_SEPARATOR: &str = ",";

/// Produce the deduplicated discovery list, scoring freshness against the
/// current time.
pub fn rank_and_deduplicate(
    scorer: &Scorer,
    observations: Vec<TrackObservation>,
) -> Vec<RankedTrack> {
    rank_and_deduplicate_at(scorer, observations, Utc::now())
}

/// Produce the deduplicated discovery list against an explicit reference
/// time.
///
/// Output is ordered by score descending. The sort is stable, so records
/// with exactly equal scores keep the order in which their identity was
/// first seen in the input.
pub fn rank_and_deduplicate_at(
    scorer: &Scorer,
    observations: Vec<TrackObservation>,
    now: DateTime<Utc>,
) -> Vec<RankedTrack> {
    let observation_count = observations.len();
    let groups = group_by_identity(observations);

    let mut ranked: Vec<RankedTrack> = groups
        .into_iter()
        .filter_map(|group| merge_group(scorer, group, now))
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    log::info!(
        "Ranked {} observations into {} tracks ({} merged)",
        observation_count,
        ranked.len(),
        ranked.iter().filter(|t| t.is_merged()).count()
    );

    ranked
}

/// Merge a group of observations of the same track into one scored record.
///
/// The observation from the highest-weight source is the representative;
/// the first one wins a tie. Its sources are replaced by the joined list of
/// every member's source, its empty metadata fields are filled from the
/// other members in order, and it is scored with the group size as the
/// source count. Returns `None` for an empty group.
pub fn merge_group(
    scorer: &Scorer,
    mut group: Vec<TrackObservation>,
    now: DateTime<Utc>,
) -> Option<RankedTrack> {
    let representative_index = select_representative(scorer, &group)?;

    let source_count = u32::try_from(group.len()).unwrap_or(u32::MAX);
    let sources = group
        .iter()
        .map(|o| o.source.as_str())
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR);

    let representative = group.remove(representative_index);
    let mut merged = RankedTrack::from_observation(representative);
    for other in &group {
        merged.metadata.fill_from(&other.metadata);
    }
    merged.source = sources;
    merged.source_count = source_count;
    merged.score = scorer.score_at(&merged, now);

    if merged.is_merged() {
        log::debug!(
            "Merged {} observations of {} - {} (representative: {}, score {:.3})",
            source_count,
            merged.artist,
            merged.title,
            merged.primary_source,
            merged.score
        );
    }

    Some(merged)
}

fn select_representative(scorer: &Scorer, group: &[TrackObservation]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, observation) in group.iter().enumerate() {
        let weight = scorer.source_weight(&observation.source);
        if best.is_none_or(|(_, best_weight)| weight > best_weight) {
            best = Some((index, weight));
        }
    }
    best.map(|(index, _)| index)
}

/// Group observations by identity key, keeping groups in first-seen order
/// and members in input order.
fn group_by_identity(observations: Vec<TrackObservation>) -> Vec<Vec<TrackObservation>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<TrackObservation>> = Vec::new();

    for observation in observations {
        match index.entry(identity_key(&observation.artist, &observation.title)) {
            Entry::Occupied(e) => {
                groups[*e.get()].push(observation);
            }
            Entry::Vacant(e) => {
                e.insert(groups.len());
                groups.push(vec![observation]);
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::SourceWeights;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn obs(artist: &str, title: &str, source: &str, rank: u32) -> TrackObservation {
        TrackObservation::new(artist, title, source, rank)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_kendrick_and_sza_scenario() {
        let scorer = Scorer::default();
        let input = vec![
            obs("Kendrick Lamar", "Track A", "billboard", 1),
            obs("Kendrick Lamar", "Track A", "hnhh", 5),
            obs("SZA", "Track B", "spotify_new_releases", 1),
        ];

        let result = rank_and_deduplicate_at(&scorer, input, fixed_now());

        assert_eq!(result.len(), 2);
        let kendrick = result
            .iter()
            .find(|t| t.artist == "Kendrick Lamar")
            .unwrap();
        assert_eq!(kendrick.source_count, 2);
        assert!(kendrick.source.contains("billboard"));
        assert!(kendrick.source.contains("hnhh"));
        assert!(result[0].score >= result[1].score);
        assert_eq!(result[0].artist, "SZA");
    }

    #[test]
    fn test_representative_is_highest_weight_source() {
        let scorer = Scorer::default();
        let input = vec![
            obs("Kendrick Lamar", "Track A", "billboard", 1),
            obs("Kendrick Lamar", "Track A", "hnhh", 5),
        ];

        let merged = merge_group(&scorer, input, fixed_now()).unwrap();

        assert_eq!(merged.primary_source, "hnhh");
        assert_eq!(merged.rank, 5);
        assert_eq!(merged.source, "billboard,hnhh");
        // 0.7 * 0.96 + 0.1
        assert!(approx(merged.score, 0.772));
    }

    #[test]
    fn test_representative_tie_keeps_first() {
        let scorer = Scorer::default();
        let input = vec![
            obs("Artist", "Song", "blog_a", 7),
            obs("Artist", "Song", "blog_b", 2),
        ];

        let merged = merge_group(&scorer, input, fixed_now()).unwrap();
        assert_eq!(merged.primary_source, "blog_a");
        assert_eq!(merged.rank, 7);
    }

    #[test]
    fn test_case_variant_source_is_unknown() {
        let scorer = Scorer::default();
        let input = vec![
            obs("Artist", "Song", "hnhh", 1),
            obs("Artist", "Song", "Spotify_New_Releases", 50),
        ];

        let merged = merge_group(&scorer, input, fixed_now()).unwrap();
        assert_eq!(merged.primary_source, "hnhh");
        assert_eq!(merged.rank, 1);
        // 0.7 * 1.0 + 0.1
        assert!(approx(merged.score, 0.8));

        let single = rank_and_deduplicate_at(
            &scorer,
            vec![obs("A", "B", "BILLBOARD", 1)],
            fixed_now(),
        );
        assert!(approx(single[0].score, 0.3));
    }

    #[test]
    fn test_dedup_reduces_cardinality() {
        let scorer = Scorer::default();
        let sources = ["billboard", "hnhh", "reddit_fresh", "pitchfork_bnm", "hnhh"];
        let input: Vec<TrackObservation> = sources
            .iter()
            .enumerate()
            .map(|(i, s)| obs("Doechii", "Anxiety", s, u32::try_from(i + 1).unwrap()))
            .collect();

        let result = rank_and_deduplicate_at(&scorer, input, fixed_now());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source_count, 5);
        assert_eq!(result[0].source, "billboard,hnhh,reddit_fresh,pitchfork_bnm,hnhh");
        assert_eq!(result[0].primary_source, "reddit_fresh");
    }

    #[test]
    fn test_feature_credit_groups_together() {
        let scorer = Scorer::default();
        let input = vec![
            obs("Drake feat. Future", "Big Song", "billboard", 1),
            obs("Drake", "Big Song", "hnhh", 3),
        ];

        let result = rank_and_deduplicate_at(&scorer, input, fixed_now());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source_count, 2);
        // the representative's own credit is kept verbatim
        assert_eq!(result[0].artist, "Drake");
    }

    #[test]
    fn test_field_fill_preserves_representative_values() {
        let scorer = Scorer::default();
        let input = vec![
            obs("A", "B", "billboard", 1)
                .with_mbid("mbid-billboard")
                .with_isrc("ISRC-BB")
                .with_thumb("https://img/bb.jpg"),
            obs("A", "B", "spotify_new_releases", 4).with_mbid("mbid-spotify"),
            obs("A", "B", "hnhh", 2)
                .with_spotify_id("sp-hnhh")
                .with_isrc("ISRC-HNHH"),
        ];

        let merged = merge_group(&scorer, input, fixed_now()).unwrap();

        assert_eq!(merged.primary_source, "spotify_new_releases");
        assert_eq!(merged.metadata.mbid.as_deref(), Some("mbid-spotify"));
        // first non-empty value in group order
        assert_eq!(merged.metadata.isrc.as_deref(), Some("ISRC-BB"));
        assert_eq!(merged.metadata.spotify_id.as_deref(), Some("sp-hnhh"));
        assert_eq!(merged.metadata.thumb.as_deref(), Some("https://img/bb.jpg"));
    }

    #[test]
    fn test_singleton_passes_through() {
        let scorer = Scorer::default();
        let now = fixed_now();
        let created = now - Duration::hours(3);
        let single = obs("Clairo", "Sexy to Someone", "pitchfork_bnm", 11)
            .with_created_at(created)
            .with_weeks_on_chart(1)
            .with_thumb("https://img/c.jpg");

        let result = rank_and_deduplicate_at(&scorer, vec![single], now);

        assert_eq!(result.len(), 1);
        let track = &result[0];
        assert_eq!(track.source, "pitchfork_bnm");
        assert_eq!(track.source_count, 1);
        assert_eq!(track.rank, 11);
        assert_eq!(track.created_at, Some(created));
        assert_eq!(track.weeks_on_chart, Some(1));
        assert_eq!(track.metadata.thumb.as_deref(), Some("https://img/c.jpg"));
        // 0.6 * 0.9 + 0.2
        assert!(approx(track.score, 0.74));
    }

    #[test]
    fn test_merged_score_uses_representative_timing() {
        let scorer = Scorer::default();
        let now = fixed_now();
        let input = vec![
            obs("A", "B", "billboard", 1).with_created_at(now - Duration::hours(1)),
            obs("A", "B", "spotify_new_releases", 1).with_created_at(now - Duration::days(10)),
        ];

        let merged = merge_group(&scorer, input, now).unwrap();

        // spotify representative is a week and a half old: no freshness
        assert!(approx(merged.score, 1.0 + 0.1));
    }

    #[test]
    fn test_sorted_by_score_descending() {
        let scorer = Scorer::default();
        let input = vec![
            obs("Low", "One", "billboard", 90),
            obs("High", "One", "spotify_new_releases", 1),
            obs("Mid", "One", "hnhh", 10),
        ];

        let result = rank_and_deduplicate_at(&scorer, input, fixed_now());
        let artists: Vec<&str> = result.iter().map(|t| t.artist.as_str()).collect();
        assert_eq!(artists, vec!["High", "Mid", "Low"]);
        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_exact_ties_keep_input_order() {
        let scorer = Scorer::default();
        let input = vec![
            obs("First", "Song", "billboard", 3),
            obs("Second", "Song", "billboard", 3),
            obs("Third", "Song", "billboard", 3),
        ];

        let result = rank_and_deduplicate_at(&scorer, input, fixed_now());
        let artists: Vec<&str> = result.iter().map(|t| t.artist.as_str()).collect();
        assert_eq!(artists, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_deterministic_output() {
        let scorer = Scorer::new(SourceWeights::default().with_weight("hypem", 0.8));
        let now = fixed_now();
        let input = vec![
            obs("Charli xcx", "360", "hypem", 2).with_created_at(now - Duration::hours(30)),
            obs("Charli XCX", "360", "billboard", 40).with_mbid("m-1"),
            obs("Chappell Roan", "Good Luck, Babe!", "reddit_fresh", 1),
            obs("Chappell Roan", "Good Luck Babe!", "hnhh", 6),
            obs("Tommy Richman", "MILLION DOLLAR BABY", "billboard", 2),
        ];

        let first = rank_and_deduplicate_at(&scorer, input.clone(), now);
        let second = rank_and_deduplicate_at(&scorer, input, now);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_empty_input() {
        let scorer = Scorer::default();
        assert!(rank_and_deduplicate_at(&scorer, Vec::new(), fixed_now()).is_empty());
        assert!(merge_group(&scorer, Vec::new(), fixed_now()).is_none());
    }

    #[test]
    fn test_group_by_identity_order() {
        let groups = group_by_identity(vec![
            obs("B", "x", "s1", 1),
            obs("A", "y", "s1", 2),
            obs("b", "X", "s2", 3),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].source, "s1");
        assert_eq!(groups[0][1].source, "s2");
        assert_eq!(groups[1][0].artist, "A");
    }
}
