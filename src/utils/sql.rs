/// Escapes `%`, `_` and the escape character itself for a LIKE pattern
/// using `\` as the escape.
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Trimmed, escaped search term, or `None` when blank.
pub fn search_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(escape_like_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape_like_pattern("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like_pattern("moyo"), "moyo");
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term(Some(" Moyo ")).as_deref(), Some("Moyo"));
        assert_eq!(search_term(Some("10%")).as_deref(), Some("10\\%"));
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(None), None);
    }
}
