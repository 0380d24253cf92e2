//! Fuzzy matching utilities for search
//!
//! Ranks labeled options against a typed or spoken query using the block
//! edit scorer. Options can carry synonym patterns, which are expanded and
//! scored alongside the label itself.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::distance::score;
use super::pattern::expand;
use crate::error::SqueezeResult;

/// A label the query may resolve to, plus optional synonym patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateOption {
    pub label: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl CandidateOption {
    /// An option matched on its label only
    pub fn bare(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            synonyms: Vec::new(),
        }
    }

    pub fn with_synonyms<S: Into<String>>(
        label: impl Into<String>,
        synonyms: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            label: label.into(),
            synonyms: synonyms.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of a ranking: the winning label and its score (lower is better)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMatch {
    pub label: String,
    pub score: i32,
}

/// Find the option that best matches `query`.
///
/// The query, labels and synonym phrases are compared lower-cased. The lowest
/// score wins, with ties going to the option listed first. Returns `None` unless the
/// winning score is strictly below `threshold`.
pub fn rank(
    query: &str,
    options: &[CandidateOption],
    threshold: i32,
) -> SqueezeResult<Option<RankedMatch>> {
    let query = query.to_lowercase();
    let mut best: Option<RankedMatch> = None;

    for option in options {
        let mut phrases = vec![option.label.to_lowercase()];
        for pattern in &option.synonyms {
            phrases.extend(expand(pattern)?.into_iter().map(|p| p.to_lowercase()));
        }

        for phrase in phrases {
            let s = score(&query, &phrase);
            debug!("  '{}' vs '{}' ({}): {}", query, phrase, option.label, s);
            if best.as_ref().map_or(true, |b| s < b.score) {
                best = Some(RankedMatch {
                    label: option.label.clone(),
                    score: s,
                });
            }
        }
    }

    match best {
        Some(m) if m.score < threshold => {
            debug!("🎯 '{}' matched '{}' (score {})", query, m.label, m.score);
            Ok(Some(m))
        }
        Some(m) => {
            debug!(
                "No match for '{}': best was '{}' at {} (threshold {})",
                query, m.label, m.score, threshold
            );
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Longest prefix, in chars, of a search term or result name that gets scored.
///
/// Scoring cost grows steeply with length on names that repeat many blocks,
/// and server result names can be arbitrarily long.
pub const MAX_MATCH_CHARS: usize = 20;

/// Lower-cased, length-bounded form of a string for search ranking
fn match_key(s: &str) -> String {
    s.to_lowercase().chars().take(MAX_MATCH_CHARS).collect()
}

/// Order `items` by how well `key(item)` lines up with `term`, best first.
///
/// Both sides are lower-cased and cut to [`MAX_MATCH_CHARS`] before scoring.
/// The sort is stable, so equally scored items keep their incoming order.
pub fn best_by_distance<T, F>(term: &str, items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let term = match_key(term);
    let mut scored: Vec<(i32, T)> = items
        .into_iter()
        .map(|item| (score(&match_key(key(&item)), &term), item))
        .collect();
    scored.sort_by_key(|(s, _)| *s);
    scored.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqueezeError;

    fn play_pause() -> Vec<CandidateOption> {
        vec![CandidateOption::bare("PLAY"), CandidateOption::bare("PAUSE")]
    }

    #[test]
    fn test_rank_close_query() {
        let best = rank("ply", &play_pause(), 5).unwrap().unwrap();
        assert_eq!(best.label, "PLAY");
        assert_eq!(best.score, -1);
    }

    #[test]
    fn test_rank_no_match() {
        assert_eq!(rank("zzzzzzzz", &play_pause(), 5).unwrap(), None);
    }

    #[test]
    fn test_rank_is_case_insensitive() {
        let best = rank("PaUsE", &play_pause(), 5).unwrap().unwrap();
        assert_eq!(best.label, "PAUSE");
    }

    #[test]
    fn test_threshold_is_strict() {
        let exact = score("play", "play");
        let options = vec![CandidateOption::bare("PLAY")];
        assert_eq!(rank("play", &options, exact).unwrap(), None);
        assert_eq!(
            rank("play", &options, exact + 1).unwrap().map(|m| m.label),
            Some("PLAY".to_string())
        );
    }

    #[test]
    fn test_synonyms_reach_label() {
        let options = vec![
            CandidateOption::bare("SKIP"),
            CandidateOption::with_synonyms("VOLUME UP", ["(turn it )?louder"]),
        ];
        let best = rank("louder", &options, 5).unwrap().unwrap();
        assert_eq!(best.label, "VOLUME UP");
    }

    #[test]
    fn test_ties_go_to_first_option() {
        let options = vec![CandidateOption::bare("stop"), CandidateOption::bare("STOP")];
        let best = rank("stop", &options, 5).unwrap().unwrap();
        assert_eq!(best.label, "stop");
    }

    #[test]
    fn test_malformed_synonym_propagates() {
        let options = vec![CandidateOption::with_synonyms("PLAY", ["(start"])];
        assert!(matches!(
            rank("play", &options, 5),
            Err(SqueezeError::MalformedPattern { .. })
        ));
    }

    #[test]
    fn test_empty_options() {
        assert_eq!(rank("play", &[], 100).unwrap(), None);
    }

    #[test]
    fn test_best_by_distance_orders_results() {
        let names = vec!["pause", "playlist", "play"];
        let ordered = best_by_distance("play", names, |n| *n);
        assert_eq!(ordered, vec!["play", "playlist", "pause"]);
    }

    #[test]
    fn test_best_by_distance_ignores_case() {
        let names = vec!["Karma", "KARMA POLICE", "Karma Police (Live)"];
        let ordered = best_by_distance("karma police", names, |n| *n);
        assert_eq!(ordered, vec!["KARMA POLICE", "Karma Police (Live)", "Karma"]);
    }

    #[test]
    fn test_match_key_is_bounded() {
        let key = match_key("Sgt. Pepper's Lonely Hearts Club Band (Remastered 2009)");
        assert_eq!(key, "sgt. pepper's lonely");
        assert_eq!(key.chars().count(), MAX_MATCH_CHARS);
        assert_eq!(match_key("Motörhead"), "motörhead");
    }

    #[test]
    fn test_best_by_distance_long_names() {
        let names = vec![
            "With a Little Help From My Friends (Remastered 2009)",
            "Sgt. Pepper's Lonely Hearts Club Band (Remastered 2009)",
            "A Day in the Life (Remastered 2009)",
        ];
        let ordered = best_by_distance("sgt peppers lonely hearts club band", names, |n| *n);
        assert_eq!(ordered[0], "Sgt. Pepper's Lonely Hearts Club Band (Remastered 2009)");
    }
}
