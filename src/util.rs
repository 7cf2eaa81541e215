//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads. The cut is moved
/// back to a char boundary so multibyte input never panics.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let tpl = "Q: {prompt}\nA: {answer}\n(repeat: {answer})";
    let out = fill_template(tpl, &[("prompt", "what port?"), ("answer", "443")]);
    assert_eq!(out, "Q: what port?\nA: 443\n(repeat: 443)");
  }

  #[test]
  fn fill_template_leaves_unknown_keys_alone() {
    assert_eq!(fill_template("{a} {b}", &[("a", "x")]), "x {b}");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    let s = "päyload".repeat(40);
    let out = trunc_for_log(&s, 10);
    assert!(out.contains("bytes total"));
    // Would have panicked on a byte-slice cut inside 'ä'.
    let _ = trunc_for_log("ääääää", 3);
  }
}
