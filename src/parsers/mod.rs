pub mod counts;
pub mod title;

pub use counts::*;
pub use title::*;

use html_escape::decode_html_entities;
use scraper::{ElementRef, Selector};

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cleaned text of the first descendant matching `selector`, if it has any
pub fn select_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|node| clean_text(&node.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

/// First non-empty attribute among `names`
pub fn first_attr(element: ElementRef<'_>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(clean_text)
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn clean_text_collapses_whitespace_and_entities() {
        assert_eq!(clean_text("  Amélie&nbsp;&amp;\n  Nino "), "Amélie & Nino");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn first_attr_skips_blank_values() {
        let html = Html::parse_fragment(r#"<div data-a=" " data-b="Heat"></div>"#);
        let div = Selector::parse("div").unwrap();
        let element = html.select(&div).next().unwrap();
        assert_eq!(first_attr(element, &["data-a", "data-b"]), Some("Heat".to_string()));
        assert_eq!(first_attr(element, &["data-c"]), None);
    }
}
