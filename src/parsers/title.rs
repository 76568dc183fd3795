use once_cell::sync::Lazy;
use regex::Regex;

static YEAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}$").expect("Invalid year regex")
});

/// Split a combined "Title (Year)" string on its last parenthesised pair.
///
/// The title is everything before the last `(`, the year is what sits between
/// it and the matching `)`. Strings without such a pair come back whole with
/// an empty year.
pub fn split_title_year(combined: &str) -> (String, String) {
    let combined = combined.trim();
    if let Some(open) = combined.rfind('(') {
        if let Some(close_offset) = combined[open..].find(')') {
            let title = combined[..open].trim();
            let year = combined[open + 1..open + close_offset].trim();
            if !title.is_empty() {
                return (title.to_string(), year.to_string());
            }
        }
    }
    (combined.to_string(), String::new())
}

/// True for a four-digit year string
pub fn is_year(text: &str) -> bool {
    YEAR_REGEX.is_match(text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_last_parenthesis_pair() {
        assert_eq!(
            split_title_year("Parasite (2019)"),
            ("Parasite".to_string(), "2019".to_string())
        );
        assert_eq!(
            split_title_year("Solaris (Solyaris) (1972)"),
            ("Solaris (Solyaris)".to_string(), "1972".to_string())
        );
    }

    #[test]
    fn missing_pair_keeps_whole_title() {
        assert_eq!(split_title_year("Heat"), ("Heat".to_string(), String::new()));
        assert_eq!(
            split_title_year("Broken (1999"),
            ("Broken (1999".to_string(), String::new())
        );
        assert_eq!(split_title_year("(2001)"), ("(2001)".to_string(), String::new()));
    }

    #[test]
    fn year_shape() {
        assert!(is_year("1999"));
        assert!(is_year(" 2024 "));
        assert!(!is_year("99"));
        assert!(!is_year("TBA"));
    }
}
