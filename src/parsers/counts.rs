use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RATING_COUNT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"ratingCount"\s*:\s*(\d+)"#).expect("Invalid rating count regex")
});

static RUNTIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*mins?\b").expect("Invalid runtime regex"));

/// Minutes from a footer such as "118 mins   More at IMDb TMDb"
pub fn parse_runtime(text: &str) -> Option<u32> {
    RUNTIME_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a rank cell such as "1", "#12" or "1,024"
pub fn parse_rank(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .trim_start_matches('#')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse a displayed count such as "12,345", "1.2K" or "3M"
pub fn parse_count(text: &str) -> Option<u64> {
    let cleaned = text.trim().replace(',', "");
    let (number, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    if multiplier == 1.0 {
        return number.parse().ok();
    }
    let value: f64 = number.trim().parse().ok()?;
    if value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Extract `aggregateRating.ratingCount` from a JSON-LD script body.
///
/// Letterboxd wraps the JSON in CDATA comments, so those are stripped first.
/// Falls back to a plain regex when the JSON itself does not parse.
pub fn rating_count_from_json_ld(script: &str) -> Option<u64> {
    let body = script
        .trim()
        .trim_start_matches("/* <![CDATA[ */")
        .trim_end_matches("/* ]]> */")
        .trim();

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(count) = json
            .get("aggregateRating")
            .and_then(|rating| rating.get("ratingCount"))
        {
            return count
                .as_u64()
                .or_else(|| count.as_str().and_then(parse_count));
        }
    }

    RATING_COUNT_REGEX
        .captures(script)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_parsing() {
        assert_eq!(parse_rank("1"), Some(1));
        assert_eq!(parse_rank(" #12 "), Some(12));
        assert_eq!(parse_rank("1,024"), Some(1024));
        assert_eq!(parse_rank(""), None);
        assert_eq!(parse_rank("-"), None);
        assert_eq!(parse_rank("3rd"), None);
    }

    #[test]
    fn count_parsing() {
        assert_eq!(parse_count("12,345"), Some(12_345));
        assert_eq!(parse_count("1.2K"), Some(1_200));
        assert_eq!(parse_count("3M"), Some(3_000_000));
        assert_eq!(parse_count("n/a"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn rating_count_from_cdata_wrapped_json() {
        let script = r#"
/* <![CDATA[ */
{"@type":"Movie","name":"Heat","aggregateRating":{"ratingValue":4.2,"ratingCount":512034}}
/* ]]> */
"#;
        assert_eq!(rating_count_from_json_ld(script), Some(512_034));
    }

    #[test]
    fn rating_count_regex_fallback() {
        let script = r#"var x = {"aggregateRating":{"ratingCount":42,}"#;
        assert_eq!(rating_count_from_json_ld(script), Some(42));
        assert_eq!(rating_count_from_json_ld("{}"), None);
    }

    #[test]
    fn runtime_from_footer() {
        assert_eq!(parse_runtime("118 mins   More at IMDb TMDb"), Some(118));
        assert_eq!(parse_runtime("1 min"), Some(1));
        assert_eq!(parse_runtime("More at IMDb TMDb"), None);
        assert_eq!(parse_runtime("12 minutes"), None);
    }
}
