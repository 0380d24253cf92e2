//! Matching engine: block edit scoring, pattern expansion and ranking

pub mod distance;
pub mod fuzzy;
pub mod pattern;
pub mod weights;

pub use distance::{score, score_with, Strategy};
pub use fuzzy::{best_by_distance, rank, CandidateOption, RankedMatch, MAX_MATCH_CHARS};
pub use pattern::{expand, expand_all};
pub use weights::{weights, OpClass, WeightTable};
