mod engine;
pub mod scoring;

pub use engine::{MatchEngine, MatchRunOutcome};
