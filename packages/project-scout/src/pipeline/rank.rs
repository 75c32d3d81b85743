//! Relevance ranking.
//!
//! Score = number of vocabulary keywords found in a summary (each keyword
//! counts once; case-insensitive substring match, no stemming). Entries are
//! ordered by score, highest first, ties kept in input order.

use crate::types::score::{ScoreEntry, Summary};

/// The fixed relevance vocabulary.
pub const RELEVANCE_KEYWORDS: [&str; 5] = [
    "construction",
    "infrastructure",
    "projects",
    "tenders",
    "california",
];

/// Count how many vocabulary keywords appear in a summary.
pub fn keyword_score(summary: &Summary) -> u32 {
    let text = summary.as_str().to_lowercase();
    RELEVANCE_KEYWORDS
        .iter()
        .filter(|keyword| text.contains(*keyword))
        .count() as u32
}

/// Order entries by score and keep the first `keep`.
///
/// Stable: equal scores stay in the order they were given, so the same
/// input always yields the same ranking.
pub fn rank_entries(entries: &[ScoreEntry], keep: usize) -> Vec<ScoreEntry> {
    let mut ordered: Vec<(usize, &ScoreEntry)> = entries.iter().enumerate().collect();
    ordered.sort_by(|(ia, a), (ib, b)| b.score.cmp(&a.score).then(ia.cmp(ib)));
    ordered
        .into_iter()
        .take(keep.min(entries.len()))
        .map(|(_, entry)| entry.clone())
        .collect()
}

/// Ranked survivor URLs.
pub fn rank(entries: &[ScoreEntry], keep: usize) -> Vec<String> {
    rank_entries(entries, keep)
        .into_iter()
        .map(|entry| entry.url)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(url: &str, score: u32) -> ScoreEntry {
        ScoreEntry {
            url: url.to_string(),
            summary: Summary::new(""),
            score,
        }
    }

    #[test]
    fn test_ties_broken_by_input_order() {
        let entries = vec![entry("A", 1), entry("B", 3), entry("C", 3), entry("D", 0)];
        assert_eq!(rank(&entries, 2), vec!["B", "C"]);
    }

    #[test]
    fn test_keep_larger_than_input() {
        let entries = vec![entry("A", 0), entry("B", 2)];
        assert_eq!(rank(&entries, 10), vec!["B", "A"]);
        assert!(rank(&[], 10).is_empty());
    }

    #[test]
    fn test_keyword_score_counts_each_keyword_once() {
        let summary = Summary::new("Construction construction CONSTRUCTION projects in California");
        assert_eq!(keyword_score(&summary), 3);

        let summary = Summary::new("infrastructure tenders projects construction california");
        assert_eq!(keyword_score(&summary), 5);

        assert_eq!(keyword_score(&Summary::new("LABEL_0")), 0);
    }

    #[test]
    fn test_substring_match_without_stemming() {
        // "project" alone is not "projects"; "reconstruction" contains "construction".
        assert_eq!(keyword_score(&Summary::new("project")), 0);
        assert_eq!(keyword_score(&Summary::new("reconstruction")), 1);
    }

    proptest! {
        #[test]
        fn prop_rank_is_deterministic_and_bounded(
            scores in proptest::collection::vec(0u32..6, 0..40),
            keep in 0usize..20,
        ) {
            let entries: Vec<ScoreEntry> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| entry(&format!("https://example.com/{i}"), *s))
                .collect();

            let first = rank(&entries, keep);
            let second = rank(&entries, keep);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), keep.min(entries.len()));

            let ranked = rank_entries(&entries, keep);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
