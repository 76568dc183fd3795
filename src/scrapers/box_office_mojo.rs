use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{CandidateRecord, Site};
use crate::parsers::{clean_text, parse_rank, select_text};
use crate::scrapers::{FilmSource, NextPage, PageExtract, SkipReason};

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.mojo-body-table tr").expect("Invalid row selector"));
static RANK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.mojo-field-type-rank").expect("Invalid rank selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.mojo-field-type-title a").expect("Invalid title selector"));
static YEAR_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.mojo-field-type-year").expect("Invalid year selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Invalid link selector"));

/// Whole-chart extractor for the lifetime gross tables.
#[derive(Debug, Default)]
pub struct BoxOfficeMojoScraper;

impl BoxOfficeMojoScraper {
    pub fn new() -> Self {
        Self
    }
}

impl FilmSource for BoxOfficeMojoScraper {
    fn site(&self) -> Site {
        Site::BoxOfficeMojo
    }

    fn extract(&self, html: &str, _page_url: &Url) -> PageExtract {
        let document = Html::parse_document(html);
        let mut extract = PageExtract {
            candidates: Vec::new(),
            skipped: Vec::new(),
            // Chart pages are addressed by offset, not by a "next" link
            next_page: NextPage::Unsignalled,
        };

        // Header rows have no rank cell and are not records
        for row in document
            .select(&ROW_SELECTOR)
            .filter(|row| row.select(&RANK_SELECTOR).next().is_some())
        {
            match extract_row(row) {
                Ok(candidate) => extract.candidates.push(candidate),
                Err(reason) => extract.skipped.push(reason),
            }
        }

        extract
    }
}

fn extract_row(row: ElementRef<'_>) -> Result<CandidateRecord, SkipReason> {
    let rank_text = select_text(row, &RANK_SELECTOR).ok_or(SkipReason::MissingRank)?;
    let rank = parse_rank(&rank_text).ok_or(SkipReason::InvalidRank(rank_text))?;

    let title = select_text(row, &TITLE_SELECTOR).ok_or(SkipReason::MissingTitle)?;

    // Prefer the linked year, fall back to the cell's own text
    let year_cell = row.select(&YEAR_CELL_SELECTOR).next().ok_or(SkipReason::MissingYear)?;
    let year = select_text(year_cell, &LINK_SELECTOR)
        .unwrap_or_else(|| clean_text(&year_cell.text().collect::<String>()));
    if year.is_empty() {
        return Err(SkipReason::MissingYear);
    }

    Ok(CandidateRecord::new(title, year).with_rank(rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CHART: &str = r#"
<html><body>
<table class="a-bordered mojo-body-table">
  <tr><th>Rank</th><th>Title</th><th>Worldwide Lifetime Gross</th><th>Year</th></tr>
  <tr>
    <td class="mojo-field-type-rank">1</td>
    <td class="mojo-field-type-title"><a href="/title/tt0499549/">Avatar</a></td>
    <td class="mojo-field-type-money">$2,923,710,708</td>
    <td class="mojo-field-type-year"><a href="/year/2009/">2009</a></td>
  </tr>
  <tr>
    <td class="mojo-field-type-rank">2</td>
    <td class="mojo-field-type-title"><a href="/title/tt4154796/">Avengers: Endgame</a></td>
    <td class="mojo-field-type-money">$2,799,439,100</td>
    <td class="mojo-field-type-year"> 2019 </td>
  </tr>
  <tr>
    <td class="mojo-field-type-rank">-</td>
    <td class="mojo-field-type-title"><a href="/title/tt0000001/">Unranked</a></td>
    <td class="mojo-field-type-year">2001</td>
  </tr>
  <tr>
    <td class="mojo-field-type-rank">4</td>
    <td class="mojo-field-type-title">No link</td>
    <td class="mojo-field-type-year">1997</td>
  </tr>
  <tr>
    <td class="mojo-field-type-rank">5</td>
    <td class="mojo-field-type-title"><a href="/title/tt2488496/">Star Wars: Episode VII - The Force Awakens</a></td>
    <td class="mojo-field-type-year"></td>
  </tr>
  <tr>
    <td class="mojo-field-type-rank">1,006</td>
    <td class="mojo-field-type-title"><a href="/title/tt0120338/">Titanic &amp; Co</a></td>
    <td class="mojo-field-type-year"><a href="/year/1997/">1997</a></td>
  </tr>
</table>
</body></html>
"#;

    fn page_url() -> Url {
        Url::parse("https://www.boxofficemojo.com/chart/ww_top_lifetime_gross/").unwrap()
    }

    #[test]
    fn extracts_ranked_rows_in_document_order() {
        let extract = BoxOfficeMojoScraper::new().extract(CHART, &page_url());

        assert_eq!(
            extract.candidates,
            vec![
                CandidateRecord::new("Avatar", "2009").with_rank(1),
                CandidateRecord::new("Avengers: Endgame", "2019").with_rank(2),
                CandidateRecord::new("Titanic & Co", "1997").with_rank(1006),
            ]
        );
        assert_eq!(extract.next_page, NextPage::Unsignalled);
    }

    #[test]
    fn bad_rows_are_skipped_with_reasons() {
        let extract = BoxOfficeMojoScraper::new().extract(CHART, &page_url());

        assert_eq!(
            extract.skipped,
            vec![
                SkipReason::InvalidRank("-".to_string()),
                SkipReason::MissingTitle,
                SkipReason::MissingYear,
            ]
        );
    }

    #[test]
    fn extraction_is_repeatable() {
        let scraper = BoxOfficeMojoScraper::new();
        assert_eq!(scraper.extract(CHART, &page_url()), scraper.extract(CHART, &page_url()));
    }

    #[test]
    fn page_without_table_is_empty() {
        let extract = BoxOfficeMojoScraper::new().extract("<html><body>503</body></html>", &page_url());
        assert!(extract.candidates.is_empty());
        assert!(extract.skipped.is_empty());
    }
}
