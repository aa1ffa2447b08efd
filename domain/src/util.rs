//! Text helpers shared by logging and console output.

/// Longest prefix of `s` of at most `max_bytes`, cut on a char boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// One-line preview of tool output: newlines collapsed, cut to `max_bytes`
/// with a trailing `...` when anything was dropped.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_str(&flat, max_bytes);
    if cut.len() < flat.len() {
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_char_boundaries() {
        // '京' is 3 bytes
        let s = "北京市";
        assert_eq!(truncate_str(s, 4), "北");
        assert_eq!(truncate_str(s, 6), "北京");
        assert_eq!(truncate_str(s, 9), "北京市");
        assert_eq!(truncate_str("", 3), "");
    }

    #[test]
    fn preview_flattens_and_marks_cut() {
        assert_eq!(preview("sunny\n  22C", 40), "sunny 22C");
        assert_eq!(preview("a long forecast line", 6), "a long...");
    }
}
