//! Ranking and deduplication engine for melodex.
//!
//! This crate turns a flat collection of per-source track observations into
//! a single deduplicated discovery list ordered by a composite score. It is
//! made of three pure stages: the [`scoring`] stage, the [`identity`]
//! resolver, and the [`merge`] ranker. Nothing here performs I/O beyond
//! loading an optional source-weight table.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod identity;
pub mod merge;
pub mod model;
pub mod provenance;
pub mod scoring;
pub mod weights;

pub use error::{Error, Result};
pub use identity::identity_key;
pub use merge::{merge_group, rank_and_deduplicate, rank_and_deduplicate_at};
pub use model::{validate_observations, RankedTrack, TrackMetadata, TrackObservation};
pub use provenance::KnownSource;
pub use scoring::{ScoreBreakdown, Scorer};
pub use weights::SourceWeights;
