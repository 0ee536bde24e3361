pub mod matching;
pub mod sessions;
