pub mod health;
pub mod matches;
pub mod sessions;

pub use health::health_check;
