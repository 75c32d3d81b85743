//! Seeded random labeler.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use crate::traits::labeler::Labeler;
use crate::types::metadata::Attributes;

const STATUSES: [&str; 2] = ["Open", "Closed"];
const STAGES: [&str; 2] = ["Planning", "Execution"];
const PROCUREMENT_METHODS: [&str; 2] = ["Design and Build", "Request for Proposal"];
const BUYERS: [&str; 2] = ["Public", "Private"];
const SUBSECTORS: [&str; 2] = ["Building Construction", "Infrastructure Development"];

const MIN_BUDGET: f64 = 100_000.0;
const MAX_BUDGET: f64 = 10_000_000.0;

/// Draws labels from a fixed vocabulary using a seeded generator.
///
/// Ignores the description. Each record gets its own generator seeded from
/// the labeler seed and the record URL, so a given seed always yields the
/// same labels for the same URL however many records are labeled
/// concurrently and in whatever order they finish.
pub struct SeededLabeler {
    seed: u64,
}

impl SeededLabeler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, url: &str) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ fnv1a(url.as_bytes()))
    }
}

/// 64-bit FNV-1a. Stable across builds, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

impl Labeler for SeededLabeler {
    fn label(&self, url: &str, _description: &str) -> Attributes {
        let mut rng = self.rng_for(url);

        let mut pick = |choices: &[&str]| -> Value {
            Value::String(choices.choose(&mut rng).copied().unwrap_or("Unknown").to_string())
        };

        let mut labels = Attributes::new();
        labels.insert("status".into(), pick(&STATUSES));
        labels.insert("stages".into(), pick(&STAGES));
        labels.insert("procurementMethod".into(), pick(&PROCUREMENT_METHODS));
        labels.insert("buyer".into(), pick(&BUYERS));
        labels.insert("subsector".into(), pick(&SUBSECTORS));

        let budget: f64 = rng.random_range(MIN_BUDGET..MAX_BUDGET);
        labels.insert("budget".into(), json!(budget.round()));
        labels.insert("currency".into(), Value::String("USD".to_string()));
        labels.insert("sector".into(), Value::String("Construction".to_string()));
        labels
    }

    fn name(&self) -> &str {
        "seeded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_labels() {
        let a = SeededLabeler::new(42);
        let b = SeededLabeler::new(42);
        for i in 0..5 {
            let url = format!("https://city{i}.gov/projects");
            assert_eq!(a.label(&url, "x"), b.label(&url, "y"));
        }
    }

    #[test]
    fn test_labels_independent_of_call_order() {
        let urls: Vec<String> = (0..6).map(|i| format!("https://u{i}.gov")).collect();

        let forward = SeededLabeler::new(11);
        let forward: Vec<_> = urls.iter().map(|u| forward.label(u, "")).collect();

        let reverse = SeededLabeler::new(11);
        let mut backward: Vec<_> = urls.iter().rev().map(|u| reverse.label(u, "")).collect();
        backward.reverse();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_seed_changes_labels() {
        let urls: Vec<String> = (0..8).map(|i| format!("https://u{i}.gov")).collect();
        let a = SeededLabeler::new(1);
        let b = SeededLabeler::new(2);
        assert!(urls.iter().any(|u| a.label(u, "") != b.label(u, "")));
    }

    #[test]
    fn test_labels_within_vocabulary() {
        let labeler = SeededLabeler::new(7);
        for i in 0..20 {
            let labels = labeler.label(&format!("https://u{i}.gov"), "");
            let status = labels["status"].as_str().unwrap();
            assert!(STATUSES.contains(&status));
            let subsector = labels["subsector"].as_str().unwrap();
            assert!(SUBSECTORS.contains(&subsector));
            let budget = labels["budget"].as_f64().unwrap();
            assert!((MIN_BUDGET..=MAX_BUDGET).contains(&budget));
            assert_eq!(labels["currency"], "USD");
        }
    }
}
