//! Alternation pattern expansion
//!
//! Synonym templates like `"(turn )?volume (up|higher)"` denote a small set of
//! literal phrases. Expansion resolves each `(x|y|z)` group left to right; a
//! group followed by `?` may also be left out entirely.

use crate::error::{SqueezeError, SqueezeResult};

/// Expand `pattern` into every literal phrase it denotes.
///
/// Partial phrases are multiplied out group by group, so the output keeps the
/// written order of alternatives, with the omitted form of an optional group last.
pub fn expand(pattern: &str) -> SqueezeResult<Vec<String>> {
    let mut phrases = vec![String::new()];
    let mut chars = pattern.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '(' => {
                let mut alternatives = vec![String::new()];
                let mut closed = false;

                for (inner_pos, inner) in chars.by_ref() {
                    match inner {
                        ')' => {
                            closed = true;
                            break;
                        }
                        '|' => alternatives.push(String::new()),
                        '(' => {
                            return Err(malformed(pattern, inner_pos, "nested group"));
                        }
                        other => {
                            if let Some(current) = alternatives.last_mut() {
                                current.push(other);
                            }
                        }
                    }
                }

                if !closed {
                    return Err(malformed(pattern, pos, "unterminated group"));
                }
                if chars.next_if(|(_, next)| *next == '?').is_some() {
                    alternatives.push(String::new());
                }

                phrases = phrases
                    .iter()
                    .flat_map(|prefix| {
                        alternatives
                            .iter()
                            .map(move |alt| format!("{}{}", prefix, alt))
                    })
                    .collect();
            }
            ')' => return Err(malformed(pattern, pos, "unmatched ')'")),
            literal => {
                for phrase in &mut phrases {
                    phrase.push(literal);
                }
            }
        }
    }

    Ok(phrases)
}

/// Expand a list of patterns, concatenating their phrases in order
pub fn expand_all<S: AsRef<str>>(patterns: &[S]) -> SqueezeResult<Vec<String>> {
    let mut phrases = Vec::new();
    for pattern in patterns {
        phrases.extend(expand(pattern.as_ref())?);
    }
    Ok(phrases)
}

fn malformed(pattern: &str, position: usize, reason: &'static str) -> SqueezeError {
    SqueezeError::MalformedPattern {
        pattern: pattern.to_string(),
        position,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn set(phrases: Vec<String>) -> HashSet<String> {
        phrases.into_iter().collect()
    }

    #[test]
    fn test_plain_pattern_is_itself() {
        assert_eq!(expand("play").unwrap(), vec!["play"]);
        assert_eq!(expand("").unwrap(), vec![""]);
    }

    #[test]
    fn test_single_group() {
        let phrases = expand("a(b|c)d").unwrap();
        assert_eq!(phrases, vec!["abd", "acd"]);
    }

    #[test]
    fn test_optional_group() {
        let phrases = expand("a(b|c)?d").unwrap();
        assert_eq!(phrases, vec!["abd", "acd", "ad"]);
    }

    #[test]
    fn test_multiple_groups_multiply() {
        let phrases = expand("(turn )?volume (up|higher)").unwrap();
        assert_eq!(
            set(phrases),
            set(vec![
                "turn volume up".into(),
                "turn volume higher".into(),
                "volume up".into(),
                "volume higher".into(),
            ])
        );
    }

    #[test]
    fn test_empty_alternative() {
        assert_eq!(expand("skip(| song)").unwrap(), vec!["skip", "skip song"]);
    }

    #[test]
    fn test_question_mark_outside_group_is_literal() {
        assert_eq!(expand("what?").unwrap(), vec!["what?"]);
    }

    #[test]
    fn test_unterminated_group_fails() {
        let err = expand("a(bd").unwrap_err();
        match err {
            SqueezeError::MalformedPattern {
                position, reason, ..
            } => {
                assert_eq!(position, 1);
                assert_eq!(reason, "unterminated group");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_stray_and_nested_parens_fail() {
        assert!(matches!(
            expand("ab)c"),
            Err(SqueezeError::MalformedPattern { position: 2, .. })
        ));
        assert!(matches!(
            expand("a(b(c)|d)"),
            Err(SqueezeError::MalformedPattern { position: 3, .. })
        ));
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let pattern = "(play|start) (the )?(song|track)";
        assert_eq!(expand(pattern).unwrap(), expand(pattern).unwrap());
        assert_eq!(expand(pattern).unwrap().len(), 8);
    }

    #[test]
    fn test_expand_all_propagates_errors() {
        assert_eq!(
            expand_all(&["a(b|c)", "d"]).unwrap(),
            vec!["ab", "ac", "d"]
        );
        assert!(expand_all(&["ok", "bad("]).is_err());
    }
}
