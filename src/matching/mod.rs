pub mod engine;
pub mod types;

pub use engine::{match_pairs, MatchStats};
pub use types::*;
