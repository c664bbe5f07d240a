//! Heuristics for location text that cannot be routed as-is.
//!
//! "the other one", "a McDonald's next to UTC" and "here" all need a lookup
//! before they can be sent to the directions service.

use std::sync::LazyLock;

use regex::RegexSet;

const VAGUE_INDICATORS: &[&str] = &[
    "here",
    "there",
    "this place",
    "that place",
    "nearby",
    "around here",
    "somewhere",
    "anywhere",
    "the mall",
    "the store",
    "the restaurant",
    "my location",
    "current location",
    "where i am",
    "where i'm at",
    "a ",
    "an ",
    "the other",
    "another",
    "different",
    "next to",
    "near",
    "close to",
    "across from",
    "behind",
    "in front of",
];

const RELATIVE_TERMS: &[&str] =
    &["next to", "near", "close to", "across from", "behind", "in front of", "beside", "adjacent to", "a ", "an "];

/// Shorter than this (trimmed, in chars) is always too vague to route.
const MIN_SPECIFIC_CHARS: usize = 5;

static VAGUE_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^[a-z]+\s+(place|location|area|spot)$",
        r"^(the|a|an)\s+[a-z]+$",
        r"^[a-z]+\s+(nearby|around|close)$",
        r"^.*\s+(next to|near|close to|across from|behind|in front of)\s+",
        r"^[a-z]+\s+[a-z]+\s+(in|at|near)\s+",
    ])
    .expect("vague location patterns compile")
});

static BUSINESS_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([r"^[a-z]+\s+(in|at|near)\s+", r"^.*\s+(in|at|near)\s+[a-z]+\s+[a-z]+"])
        .expect("business location patterns compile")
});

/// True when `location` is too vague to route without a lookup.
#[must_use]
pub fn is_vague_location(location: &str) -> bool {
    let lower = location.to_lowercase();
    VAGUE_INDICATORS.iter().any(|i| lower.contains(i))
        || location.trim().chars().count() < MIN_SPECIFIC_CHARS
        || VAGUE_PATTERNS.is_match(&lower)
}

/// True when `location` names a place relative to another one ("a McDonald's
/// next to UTC") and should be looked up even if it is not strictly vague.
#[must_use]
pub fn should_resolve_location(location: &str) -> bool {
    let lower = location.to_lowercase();
    RELATIVE_TERMS.iter().any(|t| lower.contains(t)) || BUSINESS_PATTERNS.is_match(&lower)
}

/// Either check fires.
#[must_use]
pub fn needs_resolution(location: &str) -> bool {
    is_vague_location(location) || should_resolve_location(location)
}

#[cfg(test)]
#[path = "vague_test.rs"]
mod tests;
