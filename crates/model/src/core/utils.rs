/// Remove NUL bytes from a string. `\0` is valid UTF-8 but Postgres text
/// columns reject it, so incoming values are sanitized rather than bounced.
pub fn strip_null_bytes(s: &str) -> String {
    if !s.contains('\0') {
        return s.to_string();
    }
    s.chars().filter(|ch| *ch != '\0').collect()
}

/// Escape a string per PostgreSQL COPY TEXT rules:
/// - backslash, newline, carriage return and tab are backslash-escaped
/// - everything else passes through unchanged
///
/// Callers strip NUL bytes first; this function does not re-check.
pub fn escape_copy_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => escaped.push_str(r"\n"),
            '\r' => escaped.push_str(r"\r"),
            '\t' => escaped.push_str(r"\t"),
            '\\' => escaped.push_str(r"\\"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_embedded_nul() {
        assert_eq!(strip_null_bytes("ab\0cd"), "abcd");
        assert_eq!(strip_null_bytes("\0"), "");
        assert_eq!(strip_null_bytes("clean"), "clean");
    }

    #[test]
    fn escapes_copy_control_characters() {
        assert_eq!(escape_copy_text("a\tb\nc"), r"a\tb\nc");
        assert_eq!(escape_copy_text(r"back\slash"), r"back\\slash");
        assert_eq!(escape_copy_text("plain"), "plain");
    }
}
