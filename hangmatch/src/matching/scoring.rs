//! Pure scoring functions for one (requester, candidate) pair.
//!
//! Every dimension returns an integer in `0..=100`. The weighted total is
//! computed over those sub-scores, so a perfect candidate tops out at 100.

use std::collections::HashSet;

use crate::config::ScoreWeights;
use crate::models::{ProfileSnapshot, ScoreBreakdown, TimeWindow, UserLocation};

/// All neighborhoods a user is anchored to: home, stated preferences, and
/// the neighborhoods of their registered frequent locations.
pub fn neighborhood_set(profile: &ProfileSnapshot, locations: &[UserLocation]) -> HashSet<String> {
    let mut set: HashSet<String> = HashSet::new();
    if let Some(home) = &profile.home_neighborhood {
        set.insert(home.clone());
    }
    set.extend(profile.preferred_neighborhoods.iter().cloned());
    set.extend(locations.iter().map(|l| l.neighborhood.clone()));
    set
}

/// Geographic proximity proxy: 20 points per shared neighborhood plus 10 per
/// shared train route, capped at 100. No coordinates involved.
pub fn location_score(
    a_neighborhoods: &HashSet<String>,
    a_routes: &[String],
    b_neighborhoods: &HashSet<String>,
    b_routes: &[String],
) -> i64 {
    let neighborhood_overlap = a_neighborhoods.intersection(b_neighborhoods).count() as i64;

    let b_route_set: HashSet<&str> = b_routes.iter().map(String::as_str).collect();
    let route_overlap = a_routes
        .iter()
        .filter(|r| b_route_set.contains(r.as_str()))
        .count() as i64;

    (neighborhood_overlap * 20 + route_overlap * 10).min(100)
}

fn mood_compatibility(a: &str, b: &str) -> i64 {
    if a == b {
        return 100;
    }
    let compatible = match a {
        "chill" => matches!(b, "deep_talk" | "coworking"),
        "deep_talk" => matches!(b, "chill" | "explore_nyc"),
        "explore_nyc" => matches!(b, "deep_talk" | "party"),
        "coworking" => matches!(b, "chill"),
        "party" => matches!(b, "explore_nyc"),
        _ => false,
    };
    if compatible {
        60
    } else {
        20
    }
}

/// Mood compatibility blended with energy-level proximity.
///
/// Mood base: 100 identical, 60 for a compatible pairing, 20 otherwise.
/// Energy: 100 minus 15 per level of distance, floored at 0. The result is
/// the rounded mean of the two.
pub fn mood_energy_score(mood_a: &str, energy_a: i64, mood_b: &str, energy_b: i64) -> i64 {
    let mood = mood_compatibility(mood_a, mood_b);
    let energy = (100 - (energy_a - energy_b).abs() * 15).max(0);
    (((mood + energy) as f64) / 2.0).round() as i64
}

/// Binary availability check: 100 when any window pair overlaps, else 0.
/// A zero here is a hard gate regardless of the weighted total.
pub fn time_overlap_score(a: &[TimeWindow], b: &[TimeWindow]) -> i64 {
    let overlaps = a.iter().any(|wa| b.iter().any(|wb| wa.overlaps(wb)));
    if overlaps {
        100
    } else {
        0
    }
}

/// Activity-tag overlap measured against the requester's list, with a +10
/// bonus per shared interest (case-insensitive), capped at 100.
///
/// The ratio applies whenever the requester declared activities; a candidate
/// with none then simply overlaps nothing. Only a requester with no
/// activities gets the neutral 50 base.
pub fn activity_interest_score(
    requester_activities: &[String],
    candidate_activities: &[String],
    requester_interests: &[String],
    candidate_interests: &[String],
) -> i64 {
    let base = if requester_activities.is_empty() {
        50
    } else {
        let candidate_set: HashSet<&str> =
            candidate_activities.iter().map(String::as_str).collect();
        let shared = requester_activities
            .iter()
            .filter(|a| candidate_set.contains(a.as_str()))
            .count() as f64;
        ((shared / requester_activities.len() as f64) * 100.0).round() as i64
    };

    let candidate_lower: HashSet<String> = candidate_interests
        .iter()
        .map(|i| i.to_lowercase())
        .collect();
    let shared_interests = requester_interests
        .iter()
        .filter(|i| candidate_lower.contains(&i.to_lowercase()))
        .count() as i64;

    (base + shared_interests * 10).min(100)
}

/// Flat bonus for an accepted friendship edge between the pair.
pub fn friend_bonus(friend_ids: &HashSet<String>, candidate_user_id: &str) -> i64 {
    if friend_ids.contains(candidate_user_id) {
        100
    } else {
        0
    }
}

/// Weighted total over the five sub-scores.
pub fn weighted_total(breakdown: &ScoreBreakdown, weights: &ScoreWeights) -> f64 {
    weights.location * breakdown.location as f64
        + weights.mood * breakdown.mood as f64
        + weights.time * breakdown.time as f64
        + weights.activity * breakdown.activity as f64
        + weights.friend * breakdown.friend as f64
}
