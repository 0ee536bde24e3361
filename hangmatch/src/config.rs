use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    pub session: SessionConfig,
    pub venues: Option<VenueSearchConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
    pub busy_timeout_ms: u64,
    pub journal_mode: String,
    pub synchronous: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "file:hangmatch.db".to_string(),
            auth_token: None,
            local_path: None,
            busy_timeout_ms: 5000,
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
        }
    }
}

/// Scoring weights and admission parameters for the match engine.
///
/// The defaults are load-bearing: the persisted score breakdown must stay
/// reproducible as `sum(weight_i * subscore_i)` under whatever vector was
/// active when the match was written.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    pub admission_floor: f64,
    pub top_k: usize,
    pub candidate_concurrency: usize,
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScoreWeights {
    pub location: f64,
    pub mood: f64,
    pub time: f64,
    pub activity: f64,
    pub friend: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            location: 0.30,
            mood: 0.25,
            time: 0.25,
            activity: 0.15,
            friend: 0.05,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            admission_floor: 20.0,
            top_k: 10,
            candidate_concurrency: 8,
            weights: ScoreWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub sweep_interval_secs: u64,
}

/// Venue search (Tavily) configuration. Present only when an API key is set;
/// absence means matching runs proceed without venue suggestions.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueSearchConfig {
    pub api_key: String,
    pub base_url: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HANGMATCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("HANGMATCH_PORT", 3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:hangmatch.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                busy_timeout_ms: parse_env_or("DATABASE_BUSY_TIMEOUT_MS", 5000),
                journal_mode: env::var("DATABASE_JOURNAL_MODE")
                    .unwrap_or_else(|_| "WAL".to_string()),
                synchronous: env::var("DATABASE_SYNCHRONOUS")
                    .unwrap_or_else(|_| "NORMAL".to_string()),
            },
            matching: MatchingConfig {
                admission_floor: parse_env_or("MATCH_ADMISSION_FLOOR", 20.0),
                top_k: parse_env_or("MATCH_TOP_K", 10),
                candidate_concurrency: parse_env_or("MATCH_CANDIDATE_CONCURRENCY", 8),
                weights: ScoreWeights {
                    location: parse_env_or("MATCH_WEIGHT_LOCATION", 0.30),
                    mood: parse_env_or("MATCH_WEIGHT_MOOD", 0.25),
                    time: parse_env_or("MATCH_WEIGHT_TIME", 0.25),
                    activity: parse_env_or("MATCH_WEIGHT_ACTIVITY", 0.15),
                    friend: parse_env_or("MATCH_WEIGHT_FRIEND", 0.05),
                },
            },
            session: SessionConfig {
                ttl_hours: parse_env_or("SESSION_TTL_HOURS", 48),
                sweep_interval_secs: parse_env_or("SESSION_SWEEP_INTERVAL_SECS", 300),
            },
            venues: env::var("TAVILY_API_KEY").ok().map(|api_key| VenueSearchConfig {
                api_key,
                base_url: env::var("TAVILY_BASE_URL")
                    .unwrap_or_else(|_| "https://api.tavily.com".to_string()),
                max_results: parse_env_or("VENUE_MAX_RESULTS", 5),
                timeout_secs: parse_env_or("VENUE_TIMEOUT_SECS", 10),
            }),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_matching_config_defaults() {
        std::env::remove_var("MATCH_ADMISSION_FLOOR");
        std::env::remove_var("MATCH_TOP_K");

        let config = Config::default();
        assert_eq!(config.matching.admission_floor, 20.0);
        assert_eq!(config.matching.top_k, 10);
        assert_eq!(config.matching.candidate_concurrency, 8);
    }

    #[test]
    fn test_weight_vector_defaults_sum_to_one() {
        let weights = ScoreWeights::default();
        let sum = weights.location + weights.mood + weights.time + weights.activity + weights.friend;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    #[serial]
    fn test_matching_config_from_env() {
        std::env::set_var("MATCH_ADMISSION_FLOOR", "35.5");
        std::env::set_var("MATCH_TOP_K", "3");
        std::env::set_var("MATCH_WEIGHT_LOCATION", "0.5");

        let config = Config::default();
        assert_eq!(config.matching.admission_floor, 35.5);
        assert_eq!(config.matching.top_k, 3);
        assert_eq!(config.matching.weights.location, 0.5);

        std::env::remove_var("MATCH_ADMISSION_FLOOR");
        std::env::remove_var("MATCH_TOP_K");
        std::env::remove_var("MATCH_WEIGHT_LOCATION");
    }

    #[test]
    #[serial]
    fn test_venue_config_absent_without_api_key() {
        std::env::remove_var("TAVILY_API_KEY");
        let config = Config::default();
        assert!(config.venues.is_none());
    }

    #[test]
    #[serial]
    fn test_venue_config_from_env() {
        std::env::set_var("TAVILY_API_KEY", "tvly-test");
        std::env::set_var("VENUE_MAX_RESULTS", "3");

        let config = Config::default();
        let venues = config.venues.expect("venue config should be present");
        assert_eq!(venues.api_key, "tvly-test");
        assert_eq!(venues.base_url, "https://api.tavily.com");
        assert_eq!(venues.max_results, 3);

        std::env::remove_var("TAVILY_API_KEY");
        std::env::remove_var("VENUE_MAX_RESULTS");
    }

    #[test]
    #[serial]
    fn test_database_pragmas_from_env() {
        std::env::set_var("DATABASE_BUSY_TIMEOUT_MS", "250");
        std::env::set_var("DATABASE_JOURNAL_MODE", "MEMORY");

        let config = Config::default();
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(config.database.journal_mode, "MEMORY");
        assert_eq!(config.database.synchronous, "NORMAL");

        std::env::remove_var("DATABASE_BUSY_TIMEOUT_MS");
        std::env::remove_var("DATABASE_JOURNAL_MODE");
    }

    #[test]
    #[serial]
    fn test_session_config_defaults() {
        std::env::remove_var("SESSION_TTL_HOURS");
        let config = Config::default();
        assert_eq!(config.session.ttl_hours, 48);
        assert_eq!(config.session.sweep_interval_secs, 300);
    }

    #[test]
    #[serial]
    fn test_parse_env_or_invalid_value_falls_back() {
        std::env::set_var("__TEST_PARSE_FLOOR", "not-a-number");
        let result: f64 = parse_env_or("__TEST_PARSE_FLOOR", 20.0);
        assert_eq!(result, 20.0);
        std::env::remove_var("__TEST_PARSE_FLOOR");
    }
}
