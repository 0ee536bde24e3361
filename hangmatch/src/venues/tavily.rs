//! Venue suggestions via the Tavily search API.
//!
//! Strictly best-effort: a run without a configured API key, a transport
//! error, a non-2xx status, or an unparseable body all degrade to an empty
//! suggestion list. A matching run never fails because of this collaborator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::VenueSearchConfig;
use crate::error::{HangError, Result};
use crate::models::Venue;

const SNIPPET_MAX_CHARS: usize = 100;

const INCLUDE_DOMAINS: &[&str] = &[
    "yelp.com",
    "timeout.com",
    "eater.com",
    "thrillist.com",
    "infatuation.com",
    "google.com/maps",
];

#[derive(Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_domains: &'a [&'a str],
}

#[derive(Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    content: Option<String>,
}

pub struct VenueSearchProvider {
    config: Option<VenueSearchConfig>,
    client: reqwest::Client,
}

impl VenueSearchProvider {
    pub fn new(config: Option<VenueSearchConfig>) -> Self {
        let timeout = config
            .as_ref()
            .map(|c| Duration::from_secs(c.timeout_secs))
            .unwrap_or(Duration::from_secs(10));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// One call per matching run. Returns an empty list on any failure.
    pub async fn search(
        &self,
        mood: &str,
        activities: &[String],
        neighborhood: Option<&str>,
    ) -> Vec<Venue> {
        let Some(config) = &self.config else {
            tracing::debug!("venue search not configured, skipping");
            return Vec::new();
        };

        let query = build_query(mood, activities, neighborhood);
        match self.request(config, &query).await {
            Ok(venues) => {
                tracing::debug!(count = venues.len(), %query, "venue search completed");
                venues
            }
            Err(e) => {
                tracing::warn!(error = %e, %query, "venue search failed, continuing without venues");
                Vec::new()
            }
        }
    }

    async fn request(&self, config: &VenueSearchConfig, query: &str) -> Result<Vec<Venue>> {
        let url = format!("{}/search", config.base_url.trim_end_matches('/'));
        let body = TavilySearchRequest {
            api_key: &config.api_key,
            query,
            max_results: config.max_results,
            search_depth: "basic",
            include_domains: INCLUDE_DOMAINS,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(HangError::VenueSearch(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let parsed: TavilySearchResponse = response.json().await?;
        Ok(parsed
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .map(|r| Venue {
                name: r.title,
                url: r.url,
                snippet: r.content.map(|c| truncate_chars(&c, SNIPPET_MAX_CHARS)),
            })
            .collect())
    }
}

fn mood_descriptor(mood: &str) -> &'static str {
    match mood {
        "chill" => "relaxed chill hangout spots",
        "deep_talk" => "quiet coffee shops for conversation",
        "explore_nyc" => "cool things to do activities",
        "coworking" => "co-working cafes",
        "party" => "bars nightlife social spots",
        _ => "hangout spots",
    }
}

fn build_query(mood: &str, activities: &[String], neighborhood: Option<&str>) -> String {
    let mut parts = vec![mood_descriptor(mood).to_string()];
    parts.extend(activities.iter().take(2).cloned());
    let area = neighborhood.unwrap_or("Manhattan");
    format!(
        "{} in {} New York City NYC restaurants bars cafes",
        parts.join(" "),
        area
    )
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
