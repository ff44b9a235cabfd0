pub mod observation;
pub mod ranked;

pub use observation::{validate_observations, TrackMetadata, TrackObservation};
pub use ranked::RankedTrack;
