pub mod config;
pub mod key;
pub mod rank;
pub mod score;
pub mod weights;

pub use key::show_key;
pub use rank::run_rank;
pub use score::show_score;
