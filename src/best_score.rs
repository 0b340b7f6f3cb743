//! Best score record
//!
//! A single integer persisted to LocalStorage.

use crate::platform::storage;

/// Highest score reached on this device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BestScore {
    pub score: u64,
}

impl BestScore {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "broadside_best_score";

    pub fn new(score: u64) -> Self {
        Self { score }
    }

    /// Parse a stored value. Anything unreadable counts as no record.
    pub fn parse(raw: &str) -> Self {
        let score = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0);
        Self::new(score.map(|v| v as u64).unwrap_or(0))
    }

    /// Keep `score` if it beats the record. Returns whether it did.
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.score {
            self.score = score;
            true
        } else {
            false
        }
    }

    pub fn load() -> Self {
        match storage::load(Self::STORAGE_KEY) {
            Some(raw) => {
                let best = Self::parse(&raw);
                log::info!("Best score: {}", best.score);
                best
            }
            None => Self::default(),
        }
    }

    pub fn save(&self) {
        if storage::save(Self::STORAGE_KEY, &self.score.to_string()) {
            log::info!("New best score saved: {}", self.score);
        }
    }

    /// Record a finished battle and persist a new best
    pub fn submit(&mut self, score: u64) -> bool {
        let improved = self.record(score);
        if improved {
            self.save();
        }
        improved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_improves() {
        let mut best = BestScore::default();
        assert!(!best.record(0));
        assert!(best.record(400));
        assert!(!best.record(400));
        assert!(!best.record(90));
        assert!(best.record(810));
        assert_eq!(best.score, 810);
    }

    #[test]
    fn test_parse_tolerates_junk() {
        assert_eq!(BestScore::parse("1250").score, 1250);
        assert_eq!(BestScore::parse(" 42 \n").score, 42);
        assert_eq!(BestScore::parse("1.5e3").score, 1500);
        assert_eq!(BestScore::parse("NaN").score, 0);
        assert_eq!(BestScore::parse("").score, 0);
        assert_eq!(BestScore::parse("-8").score, 0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_load_is_empty() {
        assert_eq!(BestScore::load(), BestScore::default());
    }
}
