//! Engine tuning knobs.
//!
//! The similarity thresholds and the overlap floor are product-tuning
//! choices, so they are configuration with sensible defaults rather than
//! hardcoded constants. The three-tier classification behavior itself is
//! fixed.

use facia_core::matching::{
    DEFAULT_CONSERVATIVE_THRESHOLD, DEFAULT_LIBERAL_THRESHOLD, DEFAULT_OVERLAP_FLOOR,
};
use facia_core::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lower similarity bound sent to the search call (recall-oriented).
    pub liberal_threshold: f64,
    /// Similarity at or above which a bound match is auto-confirmed.
    pub conservative_threshold: f64,
    /// Minimum overlap ratio for binding a match region to a face.
    pub overlap_floor: f64,
    /// Maximum matches requested per search call.
    pub max_search_results: u32,
    /// Backoff policy shared by the detection and recognition passes.
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            liberal_threshold: DEFAULT_LIBERAL_THRESHOLD,
            conservative_threshold: DEFAULT_CONSERVATIVE_THRESHOLD,
            overlap_floor: DEFAULT_OVERLAP_FLOOR,
            max_search_results: 50,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above.
    ///
    /// | Env Var                              | Default |
    /// |--------------------------------------|---------|
    /// | `RECOGNITION_LIBERAL_THRESHOLD`      | `60`    |
    /// | `RECOGNITION_CONSERVATIVE_THRESHOLD` | `75`    |
    /// | `MATCH_OVERLAP_FLOOR`                | `0.5`   |
    /// | `RECOGNITION_MAX_RESULTS`            | `50`    |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            liberal_threshold: env_f64("RECOGNITION_LIBERAL_THRESHOLD")
                .unwrap_or(defaults.liberal_threshold),
            conservative_threshold: env_f64("RECOGNITION_CONSERVATIVE_THRESHOLD")
                .unwrap_or(defaults.conservative_threshold),
            overlap_floor: env_f64("MATCH_OVERLAP_FLOOR").unwrap_or(defaults.overlap_floor),
            max_search_results: std::env::var("RECOGNITION_MAX_RESULTS")
                .ok()
                .map(|v| v.parse().expect("RECOGNITION_MAX_RESULTS must be a valid u32"))
                .unwrap_or(defaults.max_search_results),
            retry: defaults.retry,
        };
        config.validate();
        config
    }

    /// Panic on nonsensical threshold combinations. Run at startup so
    /// misconfiguration fails fast.
    pub fn validate(&self) {
        assert!(
            self.liberal_threshold <= self.conservative_threshold,
            "liberal threshold ({}) must not exceed conservative threshold ({})",
            self.liberal_threshold,
            self.conservative_threshold,
        );
        assert!(
            (0.0..=1.0).contains(&self.overlap_floor),
            "overlap floor must be in [0, 1], got {}",
            self.overlap_floor,
        );
    }
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .map(|v| v.parse().unwrap_or_else(|_| panic!("{name} must be a valid float")))
}
