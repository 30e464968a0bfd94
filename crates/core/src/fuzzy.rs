//! Fuzzy matching and scoring for try directory names.
//!
//! Scoring factors:
//! - Date prefix bonus: +2.0 for `YYYY-MM-DD-` prefixed names
//! - Character match: +1.0 per matched query character
//! - Word boundary bonus: +1.0 for matches at word boundaries
//! - Proximity bonus: 2.0/sqrt(gap+1) between consecutive matches
//! - Density multiplier: query_len / (last_match_index + 1)
//! - Length penalty: 10.0 / (name_len + 10.0)
//! - Recency bonus: 3.0/sqrt(hours+1) based on modification time
//!
//! Every query character must match, in order, as a subsequence of the
//! lowercased name; otherwise the score is exactly 0.0 and the candidate is
//! treated as a non-match. With an empty query only the date-prefix and
//! recency terms apply, so nothing is filtered out.

use chrono::{DateTime, Local};

/// Returns true if `name` starts with a `YYYY-MM-DD-` date prefix.
pub fn has_date_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() < 11 {
        return false;
    }

    bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
        && bytes[10] == b'-'
}

/// Calculates the fuzzy match score of `name` against `query_lower`.
///
/// `query_lower` must already be lowercased (the caller lowercases once per
/// frame, not once per candidate). `now` is passed in so that ranking is
/// deterministic under test.
pub fn calculate_score(
    name: &str,
    query_lower: &str,
    modified: Option<DateTime<Local>>,
    now: DateTime<Local>,
) -> f64 {
    let mut score = 0.0;

    if has_date_prefix(name) {
        score += 2.0;
    }

    if !query_lower.is_empty() {
        let text: Vec<char> = name.to_lowercase().chars().collect();
        let query: Vec<char> = query_lower.chars().collect();

        let mut last_pos: Option<usize> = None;
        let mut query_idx = 0;

        for (i, &ch) in text.iter().enumerate() {
            if query_idx >= query.len() {
                break;
            }

            if ch == query[query_idx] {
                score += 1.0;

                let is_boundary = i == 0 || !text[i - 1].is_alphanumeric();
                if is_boundary {
                    score += 1.0;
                }

                if let Some(last) = last_pos {
                    let gap = (i - last - 1) as f64;
                    score += 2.0 / (gap + 1.0).sqrt();
                }

                last_pos = Some(i);
                query_idx += 1;
            }
        }

        // All query chars must match
        if query_idx < query.len() {
            return 0.0;
        }

        // Density bonus: matches packed near the start of the name win
        if let Some(last) = last_pos {
            score *= query.len() as f64 / (last as f64 + 1.0);
        }

        // Length penalty
        score *= 10.0 / (name.chars().count() as f64 + 10.0);
    }

    if let Some(modified) = modified {
        let hours_since = ((now - modified).num_seconds() as f64 / 3600.0).max(0.0);
        score += 3.0 / (hours_since + 1.0).sqrt();
    }

    score
}

/// Walks `name` once, greedily consuming `query` characters left-to-right
/// (case-insensitive) and tagging each consumed character.
///
/// This walk is independent of [`calculate_score`]: for names with repeated
/// characters the two may pick different positions. Highlighting is
/// presentation only, so the divergence is accepted.
pub fn highlight(name: &str, query: &str) -> Vec<(char, bool)> {
    let query_chars: Vec<char> = query.to_lowercase().chars().collect();
    let mut query_idx = 0;

    name.chars()
        .map(|ch| {
            let matched = query_idx < query_chars.len()
                && ch.to_lowercase().next() == Some(query_chars[query_idx]);
            if matched {
                query_idx += 1;
            }
            (ch, matched)
        })
        .collect()
}

/// Wraps matched characters of `name` in `{b}`/`{/b}` style tokens.
pub fn highlight_matches(name: &str, query: &str) -> String {
    if query.is_empty() {
        return name.to_string();
    }

    let mut result = String::with_capacity(name.len());
    for (ch, matched) in highlight(name, query) {
        if matched {
            result.push_str("{b}");
            result.push(ch);
            result.push_str("{/b}");
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Local> {
        Local::now()
    }

    #[test]
    fn test_date_prefix_detection() {
        assert!(has_date_prefix("2024-01-01-foo"));
        assert!(has_date_prefix("1999-12-31-x"));
        assert!(!has_date_prefix("2024-01-01"));
        assert!(!has_date_prefix("foo-2024-01-01-"));
        assert!(!has_date_prefix("224-01-01-foo"));
        assert!(!has_date_prefix(""));
    }

    #[test]
    fn test_empty_query_scores_date_and_recency_only() {
        let at = now();
        let modified = at - Duration::hours(1);

        let plain = calculate_score("some-project", "", Some(modified), at);
        let dated = calculate_score("2024-01-01-some-project", "", Some(modified), at);

        let recency = 3.0 / (1.0_f64 + 1.0).sqrt();
        assert!((plain - recency).abs() < 1e-6);
        assert!((dated - (2.0 + recency)).abs() < 1e-6);
    }

    #[test]
    fn test_no_subsequence_scores_exactly_zero() {
        let at = now();
        // Even date prefix and recency contribute nothing for a non-match.
        let score = calculate_score("2024-01-01-bar", "fo", Some(at), at);
        assert_eq!(score, 0.0);
        assert_eq!(calculate_score("abc", "acb", None, at), 0.0);
        assert_eq!(calculate_score("abc", "abcd", None, at), 0.0);
    }

    #[test]
    fn test_subsequence_matches_score_positive() {
        let at = now();
        assert!(calculate_score("2024-01-01-foo", "fo", None, at) > 0.0);
        assert!(calculate_score("FooBar", "fb", None, at) > 0.0);
    }

    #[test]
    fn test_scenario_foo_vs_bar() {
        let at = now();
        let foo = calculate_score("2024-01-01-foo", "fo", None, at);
        let bar = calculate_score("2024-06-01-bar", "fo", None, at);
        assert!(foo > 0.0);
        assert_eq!(bar, 0.0);
    }

    #[test]
    fn test_recency_orders_empty_query() {
        let at = now();
        let fresh = calculate_score("aaa", "", Some(at - Duration::hours(1)), at);
        let stale = calculate_score("bbb", "", Some(at - Duration::hours(100)), at);
        assert!(fresh > stale);
    }

    #[test]
    fn test_word_boundary_bonus_ranks_higher() {
        let at = now();
        // Same match positions and length; only the boundary before "b" differs.
        let boundary = calculate_score("foo-bar", "fb", None, at);
        let interior = calculate_score("fooxbar", "fb", None, at);
        assert!(boundary > interior);
    }

    #[test]
    fn test_density_prefers_matches_near_start() {
        let at = now();
        let early = calculate_score("ab-rest-x", "ab", None, at);
        let late = calculate_score("rest-x-ab", "ab", None, at);
        assert!(early > late);
    }

    #[test]
    fn test_length_penalty_prefers_shorter_name() {
        let at = now();
        let short = calculate_score("kit", "kit", None, at);
        let long = calculate_score("kitchen-sink-drainer", "kit", None, at);
        assert!(short > long);
    }

    #[test]
    fn test_highlight_marks_greedy_positions() {
        let tagged = highlight("foobar", "fb");
        let marks: Vec<bool> = tagged.iter().map(|(_, m)| *m).collect();
        assert_eq!(marks, vec![true, false, false, true, false, false]);
        let chars: String = tagged.iter().map(|(c, _)| *c).collect();
        assert_eq!(chars, "foobar");
    }

    #[test]
    fn test_highlight_is_case_insensitive() {
        let tagged = highlight("FooBar", "fb");
        assert!(tagged[0].1);
        assert!(tagged[3].1);
    }

    #[test]
    fn test_highlight_matches_wraps_tokens() {
        assert_eq!(highlight_matches("abc", "b"), "a{b}b{/b}c");
        assert_eq!(highlight_matches("abc", ""), "abc");
    }

    #[test]
    fn test_highlight_consumes_repeated_chars_greedily() {
        // Greedy walk tags the first eligible occurrence of each query char.
        let tagged = highlight("abab", "ab");
        let marks: Vec<bool> = tagged.iter().map(|(_, m)| *m).collect();
        assert_eq!(marks, vec![true, true, false, false]);
    }
}
