use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

/// Lowercased, trimmed form used when keywords are compared.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Distinct non-blank keywords in normalized form.
pub fn keyword_set(keywords: &[String]) -> HashSet<String> {
    keywords
        .iter()
        .map(|k| normalize_keyword(k))
        .filter(|k| !k.is_empty())
        .collect()
}

/// Number of distinct keywords two lists share.
pub fn keyword_overlap(a: &[String], b: &[String]) -> usize {
    let set_a = keyword_set(a);
    if set_a.is_empty() {
        return 0;
    }
    keyword_set(b).intersection(&set_a).count()
}

/// Case-insensitive containment in either direction. Blank input never matches.
pub fn mutual_contains(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Cut `text` to at most `max` grapheme clusters.
pub fn truncate_graphemes(text: &str, max: usize) -> &str {
    match text.grapheme_indices(true).nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_keyword_overlap_counts_distinct_shared() {
        assert_eq!(keyword_overlap(&kw(&["a", "b", "c"]), &kw(&["a", "b"])), 2);
        assert_eq!(keyword_overlap(&kw(&["a", "b", "c"]), &kw(&["a", "c", "d"])), 2);
        assert_eq!(keyword_overlap(&kw(&["a", "a", "b"]), &kw(&["a"])), 1);
    }

    #[test]
    fn test_keyword_overlap_ignores_case_and_blanks() {
        assert_eq!(keyword_overlap(&kw(&["Numb", " sichuan "]), &kw(&["numb", "SICHUAN"])), 2);
        assert_eq!(keyword_overlap(&kw(&["", "  "]), &kw(&["", "  "])), 0);
    }

    #[test]
    fn test_keyword_overlap_empty() {
        assert_eq!(keyword_overlap(&[], &kw(&["a"])), 0);
        assert_eq!(keyword_overlap(&kw(&["a"]), &[]), 0);
    }

    #[test]
    fn test_mutual_contains() {
        assert!(mutual_contains("Haidilao Hot Pot", "haidilao"));
        assert!(mutual_contains("Cafe", "Blue Bottle Cafe"));
        assert!(!mutual_contains("Sushi Dai", "Ramen Jiro"));
        assert!(!mutual_contains("Sushi Dai", "  "));
        assert!(!mutual_contains("", ""));
    }

    #[test]
    fn test_truncate_graphemes() {
        assert_eq!(truncate_graphemes("hello", 10), "hello");
        assert_eq!(truncate_graphemes("hello", 3), "hel");
        assert_eq!(truncate_graphemes("今天很开心", 2), "今天");
        assert_eq!(truncate_graphemes("e\u{301}tude", 1), "e\u{301}");
        assert_eq!(truncate_graphemes("", 0), "");
    }
}
