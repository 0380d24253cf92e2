//! Weighted block edit scorer
//!
//! Scores how well a source string lines up with a target string by searching
//! over block level edits: keeping matching blocks (rewarded), inserting,
//! dropping or substituting blocks, and moving a block to another position.
//!
//! The score is reflexive but NOT symmetric or transitive, does not satisfy the
//! triangle inequality and can go negative. Lower is better.

use std::collections::HashMap;

use super::weights::{weights, OpClass, WeightTable};

/// Which block lengths the scorer explores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Every block length. Deterministic reference behavior.
    #[default]
    Exhaustive,
    /// Odd block lengths only. Faster on long strings, but gives different scores.
    Strided,
}

impl Strategy {
    fn step(self) -> usize {
        match self {
            Strategy::Exhaustive => 1,
            Strategy::Strided => 2,
        }
    }
}

/// Score `a` against `b` with the exhaustive strategy
pub fn score(a: &str, b: &str) -> i32 {
    score_with(a, b, Strategy::Exhaustive)
}

/// Score `a` against `b` with an explicit strategy
pub fn score_with(a: &str, b: &str, strategy: Strategy) -> i32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut scorer = Scorer {
        weights: weights(),
        step: strategy.step(),
        memo: Memo::default(),
    };
    scorer.distance(&a, &b)
}

/// Best scores per remaining (source, target) pair, for a single top-level call.
///
/// Keyed by content: a transposition leaves a non-contiguous remainder, so the
/// subproblems are not always suffixes of the inputs.
#[derive(Default)]
struct Memo {
    entries: HashMap<Vec<char>, HashMap<Vec<char>, i32>>,
}

impl Memo {
    fn get(&self, a: &[char], b: &[char]) -> Option<i32> {
        self.entries.get(a)?.get(b).copied()
    }

    fn insert(&mut self, a: &[char], b: &[char], value: i32) {
        self.entries
            .entry(a.to_vec())
            .or_default()
            .insert(b.to_vec(), value);
    }
}

struct Scorer {
    weights: &'static WeightTable,
    step: usize,
    memo: Memo,
}

impl Scorer {
    fn distance(&mut self, a: &[char], b: &[char]) -> i32 {
        if let Some(known) = self.memo.get(a, b) {
            return known;
        }
        if a.is_empty() {
            return b.len() as i32;
        }
        if b.is_empty() {
            return a.len() as i32;
        }

        let w = self.weights;
        let minlen = a.len().min(b.len()) + 1;
        let mut best = i32::MAX;

        for i in (1..minlen).step_by(self.step) {
            let head = if a[..i] == b[..i] {
                w.get(OpClass::Correct, i)
            } else {
                w.get(OpClass::Swap, i)
            };
            best = best.min(head + self.distance(&a[i..], &b[i..]));
            best = best.min(w.get(OpClass::Add, i) + self.distance(a, &b[i..]));
            best = best.min(w.get(OpClass::Sub, i) + self.distance(&a[i..], b));
        }

        // Block moves: the head of one side found further along the other side.
        if a.len() > 1 && b.len() > 1 {
            for i in (3..minlen).step_by(self.step) {
                let trans = w.get(OpClass::Trans, i);
                for j in i..(minlen - i) {
                    if a[..i] == b[j..j + i] {
                        let rest = without_block(b, j, i);
                        best = best.min(trans + self.distance(&a[i..], &rest));
                    }
                    if a[j..j + i] == b[..i] {
                        let rest = without_block(a, j, i);
                        best = best.min(trans + self.distance(&rest, &b[i..]));
                    }
                }
            }
        }

        self.memo.insert(a, b, best);
        best
    }
}

fn without_block(s: &[char], start: usize, len: usize) -> Vec<char> {
    s[..start].iter().chain(&s[start + len..]).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert_eq!(score("", ""), 0);
        assert_eq!(score("", "abc"), 3);
        assert_eq!(score("abc", ""), 3);
    }

    #[test]
    fn test_identical_strings_are_rewarded() {
        assert_eq!(score("play", "play"), -5);
        assert_eq!(score("pause", "pause"), -6);
        assert_eq!(score("volume up", "volume up"), -13);
    }

    #[test]
    fn test_known_scores() {
        assert_eq!(score("ply", "play"), -1);
        assert_eq!(score("ply", "pause"), 7);
        assert_eq!(score("hello", "help"), 1);
        assert_eq!(score("kitten", "sitting"), 11);
        assert_eq!(score("a", "b"), 3);
    }

    #[test]
    fn test_asymmetry_is_permitted() {
        assert_eq!(score("ply", "play"), -1);
        assert_eq!(score("play", "ply"), 2);
        assert_ne!(score("beatles", "the beatles"), score("the beatles", "beatles"));
    }

    #[test]
    fn test_transposed_blocks_are_cheap() {
        assert_eq!(score("abcdef", "defabc"), -1);
        assert_eq!(score("dark side", "side dark"), 0);
    }

    #[test]
    fn test_deterministic() {
        let first = score("the dark side of the moon", "dark side moon");
        for _ in 0..3 {
            assert_eq!(score("the dark side of the moon", "dark side moon"), first);
        }
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(score("play", "PLAY"), 8);
    }

    #[test]
    fn test_strided_strategy_is_distinct() {
        assert_eq!(score_with("play", "play", Strategy::Strided), -4);
        assert_eq!(score_with("play", "play", Strategy::Exhaustive), -5);
        assert_eq!(score_with("ply", "pause", Strategy::Strided), 9);
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(score("café", "café"), score("cafe", "cafe"));
        assert!(score("motörhead", "motorhead") < score("motörhead", "zzzzzzzzz"));
    }
}
