//! Common utilities for the transit-graph toolkit

pub mod error;

pub use error::{suggest_correction, Error, Result};

#[cfg(test)]
mod tests {
    use crate::error::suggest_correction;

    #[test]
    fn suggest_correction_returns_expected_algorithm() {
        assert_eq!(
            suggest_correction("dijkstr", &["dijkstra", "astar", "floyd-warshall"]),
            Some("dijkstra".to_string())
        );
    }
}
