//! Local answer validation for pattern-backed locks.
//!
//! Authored patterns may start with an inline flag marker such as `(?i)` or
//! `(?im)`. The marker is stripped, its letters become matcher options, and
//! the remainder is compiled as the actual expression. Matching is an
//! unanchored search, so patterns that mean whole-string anchor themselves
//! (`^...$`).

use regex::RegexBuilder;

/// Outcome of checking one answer against one authored pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternOutcome {
  Match,
  NoMatch,
  /// The authored pattern does not compile. Surfaced to the learner as a
  /// generic validation error, never as a wrong answer.
  Invalid(String),
}

/// Split a leading inline flag marker off the pattern, if present.
/// Returns (flag letters, remaining pattern). Only a `(?...)` group made
/// entirely of `i`/`m`/`s`/`u` counts as a marker; anything else (e.g. a
/// `(?:` group) is left in the pattern text untouched.
fn split_flags(pattern: &str) -> (&str, &str) {
  let Some(body) = pattern.strip_prefix("(?") else {
    return ("", pattern);
  };
  let Some(close) = body.find(')') else {
    return ("", pattern);
  };
  let letters = &body[..close];
  if letters.is_empty() || !letters.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'u')) {
    return ("", pattern);
  }
  (letters, &body[close + 1..])
}

/// Check `answer` (already trimmed by the caller) against `pattern`.
pub fn check_pattern(pattern: &str, answer: &str) -> PatternOutcome {
  let (flags, rest) = split_flags(pattern);

  let mut builder = RegexBuilder::new(rest);
  for f in flags.chars() {
    match f {
      'i' => {
        builder.case_insensitive(true);
      }
      'm' => {
        builder.multi_line(true);
      }
      's' => {
        builder.dot_matches_new_line(true);
      }
      'u' => {
        builder.unicode(true);
      }
      _ => {}
    }
  }

  match builder.build() {
    Ok(re) => {
      if re.is_match(answer) {
        PatternOutcome::Match
      } else {
        PatternOutcome::NoMatch
      }
    }
    Err(e) => PatternOutcome::Invalid(e.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn anchored_port_pattern_accepts_exact_answer() {
    assert_eq!(check_pattern("^443$", "443"), PatternOutcome::Match);
    assert_eq!(check_pattern("^443$", "80"), PatternOutcome::NoMatch);
    assert_eq!(check_pattern("^443$", "4433"), PatternOutcome::NoMatch);
  }

  #[test]
  fn inline_flag_marker_is_stripped_and_applied() {
    assert_eq!(check_pattern("(?i)^(E|AND)$", "and"), PatternOutcome::Match);
    assert_eq!(check_pattern("(?i)^(E|AND)$", "AND"), PatternOutcome::Match);
    assert_eq!(check_pattern("(?i)^(E|AND)$", "e"), PatternOutcome::Match);
    assert_eq!(check_pattern("(?i)^(E|AND)$", "or"), PatternOutcome::NoMatch);
  }

  #[test]
  fn multiple_flag_letters_all_apply() {
    assert_eq!(check_pattern("(?is)^a.b$", "A\nB"), PatternOutcome::Match);
    assert_eq!(check_pattern("^a.b$", "a\nb"), PatternOutcome::NoMatch);
  }

  #[test]
  fn non_flag_group_prefix_is_left_in_the_pattern() {
    assert_eq!(check_pattern("(?:443|8443)", "port 8443"), PatternOutcome::Match);
    assert_eq!(check_pattern("(?:443|8443)", "port 80"), PatternOutcome::NoMatch);
  }

  #[test]
  fn unanchored_pattern_matches_anywhere() {
    assert_eq!(
      check_pattern("(?i)RANSOMWARE", "it is ransomware!"),
      PatternOutcome::Match
    );
  }

  #[test]
  fn malformed_pattern_reports_invalid_not_mismatch() {
    // Lookahead is not supported by the engine; authored patterns using it
    // must surface as a compile failure the caller can report generically.
    assert!(matches!(
      check_pattern("(?=.*[A-Z]).{8,}", "Whatever123"),
      PatternOutcome::Invalid(_)
    ));
    assert!(matches!(
      check_pattern("[unclosed", "anything"),
      PatternOutcome::Invalid(_)
    ));
  }

  #[test]
  fn flag_splitting_edge_cases() {
    assert_eq!(split_flags("(?i)abc"), ("i", "abc"));
    assert_eq!(split_flags("(?imsu)x"), ("imsu", "x"));
    assert_eq!(split_flags("(?:abc)"), ("", "(?:abc)"));
    assert_eq!(split_flags("(?)abc"), ("", "(?)abc"));
    assert_eq!(split_flags("plain"), ("", "plain"));
    assert_eq!(split_flags("(?i"), ("", "(?i"));
  }
}
