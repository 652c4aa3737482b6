//! Utility functions for the ranking engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique session ID
pub fn generate_session_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

/// Check if two ratings are within the given tolerance
pub fn ratings_within_tolerance(rating1: f64, rating2: f64, tolerance: f64) -> bool {
    rating_difference(rating1, rating2) <= tolerance
}

/// Canonical key for an unordered item pair, used for duplicate detection
pub fn unordered_pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_session_ids() {
        let id1 = generate_session_id();
        let id2 = generate_session_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_rating_difference() {
        assert_eq!(rating_difference(1500.0, 1400.0), 100.0);
        assert_eq!(rating_difference(1400.0, 1500.0), 100.0);
        assert_eq!(rating_difference(1500.0, 1500.0), 0.0);
    }

    #[test]
    fn test_ratings_within_tolerance() {
        assert!(ratings_within_tolerance(1500.0, 1450.0, 100.0));
        assert!(!ratings_within_tolerance(1500.0, 850.0, 600.0));
        assert!(ratings_within_tolerance(1500.0, 1500.0, 0.0));
    }

    #[test]
    fn test_unordered_pair_key_is_symmetric() {
        assert_eq!(unordered_pair_key("a", "b"), unordered_pair_key("b", "a"));
        assert_eq!(unordered_pair_key("x", "x"), ("x".into(), "x".into()));
    }
}
