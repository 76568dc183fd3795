use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use url::Url;

// NewType pattern for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilmId(pub String);

impl fmt::Display for FilmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed, not-yet-validated film entry from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub rank: Option<u32>,
    pub title: String,
    /// Four-digit release year, empty when the source does not show one.
    pub year: String,
    pub external_id: Option<FilmId>,
    /// Watch or rating count; `None` when the page does not expose it.
    pub popularity: Option<u64>,
    /// Runtime in minutes, known only after enrichment.
    pub runtime: Option<u32>,
    /// Film detail page, used for enrichment.
    pub detail_url: Option<Url>,
}

impl CandidateRecord {
    pub fn new(title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            rank: None,
            title: title.into(),
            year: year.into(),
            external_id: None,
            popularity: None,
            runtime: None,
            detail_url: None,
        }
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_popularity(mut self, popularity: u64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    pub fn with_runtime(mut self, minutes: u32) -> Self {
        self.runtime = Some(minutes);
        self
    }

    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(FilmId(id.into()));
        self
    }

    pub fn with_detail_url(mut self, url: Url) -> Self {
        self.detail_url = Some(url);
        self
    }

    /// Title and year, plus the film page when the year is unknown so that
    /// same-titled films without a year stay distinct.
    pub fn dedup_key(&self) -> DedupKey {
        let key = DedupKey::new(&self.title, &self.year);
        match &self.detail_url {
            Some(url) if self.year.trim().is_empty() => key.with_page(url),
            _ => key,
        }
    }

    /// "Title (Year)" for log lines.
    pub fn label(&self) -> String {
        if self.year.is_empty() {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.year)
        }
    }
}

/// A candidate that passed filtering and deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedRecord {
    pub record: CandidateRecord,
    /// 1-based position in the accepted sequence at acceptance time.
    pub original_order: usize,
}

/// Normalized (title, year) pair used for duplicate suppression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    title: String,
    year: String,
    page: Option<String>,
}

impl DedupKey {
    pub fn new(title: &str, year: &str) -> Self {
        Self {
            title: normalize_for_key(title),
            year: normalize_for_key(year),
            page: None,
        }
    }

    fn with_page(mut self, url: &Url) -> Self {
        let path = url.path().trim_end_matches('/');
        self.page = Some(format!("{}{}", url.host_str().unwrap_or_default(), path).to_lowercase());
        self
    }
}

/// NFKC, trim, then case-fold. Only used for comparison; stored output keeps
/// the original casing.
pub fn normalize_for_key(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    // Lowercasing leaves these two unfolded
    composed
        .trim()
        .to_lowercase()
        .replace('ß', "ss")
        .replace('ς', "σ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_ignores_case_and_whitespace() {
        assert_eq!(DedupKey::new("  Movie ", "2020"), DedupKey::new("MOVIE", " 2020"));
        assert_ne!(DedupKey::new("Movie", "2020"), DedupKey::new("Movie", "2021"));
    }

    #[test]
    fn dedup_key_applies_compatibility_normalization() {
        // Full-width letters and the "ﬁ" ligature fold to their ASCII forms
        assert_eq!(DedupKey::new("ＡＬＩＥＮ", "1979"), DedupKey::new("alien", "1979"));
        assert_eq!(DedupKey::new("ﬁght club", "1999"), DedupKey::new("Fight Club", "1999"));
        // Composed and decomposed accents compare equal
        assert_eq!(
            DedupKey::new("Am\u{e9}lie", "2001"),
            DedupKey::new("Ame\u{301}lie", "2001")
        );
    }

    #[test]
    fn dedup_key_folds_sharp_s_and_final_sigma() {
        assert_eq!(DedupKey::new("Straße", "2004"), DedupKey::new("STRASSE", "2004"));
        assert_eq!(DedupKey::new("ΟΔΥΣΣΕΥΣ", "1954"), DedupKey::new("Οδυσσευς", "1954"));
    }

    #[test]
    fn yearless_records_are_told_apart_by_film_page() {
        let page = |slug: &str| Url::parse(&format!("https://letterboxd.com/film/{}/", slug)).unwrap();
        let hamlet = CandidateRecord::new("Hamlet", "").with_detail_url(page("hamlet"));
        let remake = CandidateRecord::new("Hamlet", "").with_detail_url(page("hamlet-1996"));
        let same_page = CandidateRecord::new("HAMLET", "").with_detail_url(page("hamlet"));

        assert_ne!(hamlet.dedup_key(), remake.dedup_key());
        assert_eq!(hamlet.dedup_key(), same_page.dedup_key());
        // A known year keeps the key independent of the link
        assert_eq!(
            CandidateRecord::new("Hamlet", "1948").with_detail_url(page("hamlet")).dedup_key(),
            CandidateRecord::new("Hamlet", "1948").dedup_key()
        );
    }

    #[test]
    fn label_omits_missing_year() {
        assert_eq!(CandidateRecord::new("Heat", "1995").label(), "Heat (1995)");
        assert_eq!(CandidateRecord::new("Heat", "").label(), "Heat");
    }
}
