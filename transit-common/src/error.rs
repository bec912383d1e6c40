//! Error types and utilities for the transit-graph toolkit
//!
//! Provides the shared error enum and fuzzy matching for user supplied names
//! (algorithm names, subcommand values).

use std::path::PathBuf;

use strsim::{jaro_winkler, normalized_levenshtein};
use thiserror::Error;

/// Main error type for transit-graph operations
#[derive(Debug, Error)]
pub enum Error {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A network data file contained a line that could not be decoded
    #[error("Parse error in {}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// Invalid configuration or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file could not be decoded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shortest path algorithm name not recognized
    #[error("Unknown algorithm '{given}'{}", did_you_mean(.suggestion))]
    UnknownAlgorithm {
        given: String,
        suggestion: Option<String>,
    },

    /// All-pairs computation refused because the graph is too large
    #[error("Graph has {vertices} vertices, all-pairs search is limited to {limit}")]
    Capacity { vertices: usize, limit: usize },

    /// No line satisfying the length constraint was found within the attempt budget
    #[error(
        "Insufficient network size for {mode} lines of at least {min_stops} stops: \
         gave up after {attempts} attempts ({produced} lines produced)"
    )]
    LineConstraintUnsatisfied {
        mode: String,
        min_stops: usize,
        attempts: usize,
        produced: usize,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(", did you mean '{s}'?"))
        .unwrap_or_default()
}

/// Convenience result type for transit-graph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimum combined similarity for a candidate to be suggested.
///
/// Tuned so that "dijkstr" or "floyd" find their target while unrelated input
/// such as "bogus" stays unmatched.
const MIN_SIMILARITY: f64 = 0.7;

/// Suggest the closest candidate for a potentially misspelled name
///
/// Scores each candidate with Jaro-Winkler (70%) and normalized Levenshtein
/// (30%), plus a prefix bonus when the input is a prefix of the candidate.
/// Returns `None` for exact case-insensitive matches and for inputs that are
/// not similar enough to anything.
pub fn suggest_correction(input: &str, candidates: &[&str]) -> Option<String> {
    let input_lower = input.to_lowercase();
    if input_lower.is_empty() {
        return None;
    }

    if candidates.iter().any(|c| c.eq_ignore_ascii_case(input)) {
        return None;
    }

    let mut best_match = None;
    let mut best_score = 0.0f64;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();

        let jw_score = jaro_winkler(&input_lower, &candidate_lower);
        let lev_score = normalized_levenshtein(&input_lower, &candidate_lower);
        let mut score = 0.7 * jw_score + 0.3 * lev_score;

        if input_lower.len() >= 3 && candidate_lower.starts_with(&input_lower) {
            score += 0.2;
        }

        if score >= MIN_SIMILARITY && score > best_score {
            best_score = score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALGORITHMS: &[&str] = &["dijkstra", "a*", "astar", "floyd-warshall"];

    #[test]
    fn test_suggest_correction_typos() {
        assert_eq!(
            suggest_correction("dijkstar", ALGORITHMS),
            Some("dijkstra".to_string())
        );
        assert_eq!(
            suggest_correction("floyd-warshal", ALGORITHMS),
            Some("floyd-warshall".to_string())
        );
        assert_eq!(
            suggest_correction("asta", ALGORITHMS),
            Some("astar".to_string())
        );
    }

    #[test]
    fn test_suggest_correction_prefix() {
        assert_eq!(
            suggest_correction("floyd", ALGORITHMS),
            Some("floyd-warshall".to_string())
        );
    }

    #[test]
    fn test_suggest_correction_no_match() {
        assert_eq!(suggest_correction("bogus", ALGORITHMS), None);
        assert_eq!(suggest_correction("", ALGORITHMS), None);
        assert_eq!(suggest_correction("DIJKSTRA", ALGORITHMS), None); // Correct spelling, just wrong case
    }

    #[test]
    fn test_error_display() {
        let err = Error::UnknownAlgorithm {
            given: "dijkstar".to_string(),
            suggestion: Some("dijkstra".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unknown algorithm 'dijkstar', did you mean 'dijkstra'?"
        );

        let err = Error::UnknownAlgorithm {
            given: "bogus".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "Unknown algorithm 'bogus'");

        let err = Error::Parse {
            path: PathBuf::from("porto_a.txt"),
            line: 3,
            message: "missing latitude".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error in porto_a.txt:3: missing latitude");
    }

    #[test]
    fn test_capacity_display() {
        let err = Error::Capacity {
            vertices: 5000,
            limit: 2000,
        };
        assert!(err.to_string().contains("5000"));
        assert!(err.to_string().contains("2000"));
    }
}
