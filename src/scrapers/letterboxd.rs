use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::{CandidateRecord, Site};
use crate::parsers::{
    clean_text, first_attr, is_year, parse_rank, parse_runtime, rating_count_from_json_ld,
    select_text, split_title_year,
};
use crate::scrapers::{FilmSource, NextPage, PageExtract, SkipReason};
use crate::utils::PageFetcher;

static CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li.poster-container").expect("Invalid container selector"));
static POSTER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.film-poster, div.react-component, div[data-film-slug]")
        .expect("Invalid poster selector")
});
static BARE_POSTER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.react-component.poster").expect("Invalid poster selector"));
static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("Invalid img selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Invalid link selector"));
static LIST_NUMBER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.list-number").expect("Invalid list number selector"));
static NEXT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.next").expect("Invalid next selector"));

static OG_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("Invalid og:title selector")
});
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Invalid body selector"));
static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("Invalid script selector"));
static FOOTER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.text-link.text-footer").expect("Invalid footer selector"));

const NAME_ATTRS: &[&str] = &["data-film-name"];
const YEAR_ATTRS: &[&str] = &["data-film-release-year"];
const COMBINED_ATTRS: &[&str] = &["data-item-full-display-name", "data-item-name"];
const LINK_ATTRS: &[&str] = &["data-target-link", "data-film-link", "data-item-link"];

/// Poster grids: the films browser, user lists and watchlists.
#[derive(Debug)]
pub struct LetterboxdScraper {
    enrich: bool,
}

impl LetterboxdScraper {
    pub fn new(enrich: bool) -> Self {
        Self { enrich }
    }
}

#[async_trait]
impl FilmSource for LetterboxdScraper {
    fn site(&self) -> Site {
        Site::Letterboxd
    }

    fn extract(&self, html: &str, page_url: &Url) -> PageExtract {
        let document = Html::parse_document(html);

        let mut entries: Vec<(ElementRef<'_>, ElementRef<'_>)> = document
            .select(&CONTAINER_SELECTOR)
            .map(|container| {
                let poster = container.select(&POSTER_SELECTOR).next().unwrap_or(container);
                (container, poster)
            })
            .collect();
        if entries.is_empty() {
            entries = document
                .select(&BARE_POSTER_SELECTOR)
                .map(|poster| (poster, poster))
                .collect();
        }

        let mut extract = PageExtract {
            candidates: Vec::new(),
            skipped: Vec::new(),
            next_page: if document.select(&NEXT_SELECTOR).next().is_some() {
                NextPage::Available
            } else {
                NextPage::Exhausted
            },
        };

        for (container, poster) in entries {
            match extract_entry(container, poster, page_url) {
                Ok(candidate) => extract.candidates.push(candidate),
                Err(reason) => extract.skipped.push(reason),
            }
        }

        extract
    }

    fn enriches(&self) -> bool {
        self.enrich
    }

    async fn enrich(
        &self,
        candidate: CandidateRecord,
        fetcher: &dyn PageFetcher,
    ) -> Result<CandidateRecord, SkipReason> {
        let url = candidate
            .detail_url
            .clone()
            .ok_or(SkipReason::MissingDetailPage)?;

        debug!("Fetching film page {}", url);
        let html = fetcher
            .fetch(&url)
            .await
            .map_err(|e| SkipReason::EnrichmentFailed(e.to_string()))?;

        Ok(parse_film_page(&html).apply_to(candidate))
    }

    fn ready_selector(&self) -> Option<&'static str> {
        Some("li.poster-container, div.react-component.poster")
    }
}

fn extract_entry(
    container: ElementRef<'_>,
    poster: ElementRef<'_>,
    page_url: &Url,
) -> Result<CandidateRecord, SkipReason> {
    let name = first_attr(poster, NAME_ATTRS).or_else(|| first_attr(container, NAME_ATTRS));
    let year = first_attr(poster, YEAR_ATTRS).or_else(|| first_attr(container, YEAR_ATTRS));

    let (title, year) = match (name, year) {
        (Some(title), Some(year)) => (title, year),
        (name, year) => {
            // Only a combined "Title (Year)" string is available
            let combined = first_attr(poster, COMBINED_ATTRS)
                .or_else(|| first_attr(container, COMBINED_ATTRS))
                .or_else(|| {
                    container
                        .select(&IMG_SELECTOR)
                        .next()
                        .and_then(|img| first_attr(img, &["alt"]))
                });
            let (combined_title, combined_year) = combined
                .map(|text| split_title_year(&text))
                .unwrap_or_default();
            let title = name.or_else(|| Some(combined_title).filter(|t| !t.is_empty()));
            let year = year.or_else(|| Some(combined_year).filter(|y| !y.is_empty()));
            (title.ok_or(SkipReason::MissingTitle)?, year.unwrap_or_default())
        }
    };
    let year = if is_year(&year) { year } else { String::new() };

    let mut candidate = CandidateRecord::new(title, year);

    if let Some(rank) = select_text(container, &LIST_NUMBER_SELECTOR).and_then(|t| parse_rank(&t)) {
        candidate = candidate.with_rank(rank);
    }

    let link = first_attr(poster, LINK_ATTRS)
        .or_else(|| first_attr(container, LINK_ATTRS))
        .or_else(|| {
            container
                .select(&LINK_SELECTOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string)
        });
    if let Some(detail_url) = link.and_then(|href| page_url.join(&href).ok()) {
        candidate = candidate.with_detail_url(detail_url);
    }

    Ok(candidate)
}

/// Fields read from a single film page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilmPage {
    pub title: Option<String>,
    pub year: Option<String>,
    pub tmdb_id: Option<String>,
    pub rating_count: Option<u64>,
    pub runtime: Option<u32>,
}

impl FilmPage {
    /// A new candidate carrying the film page's data, keeping list-level
    /// values where the film page has none.
    pub fn apply_to(self, candidate: CandidateRecord) -> CandidateRecord {
        let CandidateRecord {
            rank,
            title,
            year,
            external_id,
            popularity,
            runtime,
            detail_url,
        } = candidate;

        CandidateRecord {
            rank,
            title: self.title.unwrap_or(title),
            year: self.year.unwrap_or(year),
            external_id: self.tmdb_id.map(crate::models::FilmId).or(external_id),
            popularity: self.rating_count.or(popularity),
            runtime: self.runtime.or(runtime),
            detail_url,
        }
    }
}

pub fn parse_film_page(html: &str) -> FilmPage {
    let document = Html::parse_document(html);
    let mut page = FilmPage::default();

    if let Some(content) = document
        .select(&OG_TITLE_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
    {
        let (title, year) = split_title_year(&clean_text(content));
        if !title.is_empty() {
            page.title = Some(title);
        }
        if is_year(&year) {
            page.year = Some(year);
        }
    }

    page.tmdb_id = document
        .select(&BODY_SELECTOR)
        .next()
        .and_then(|body| first_attr(body, &["data-tmdb-id"]));

    page.rating_count = document
        .select(&SCRIPT_SELECTOR)
        .map(|script| script.text().collect::<String>())
        .filter(|text| text.contains("aggregateRating"))
        .find_map(|text| rating_count_from_json_ld(&text));

    page.runtime = document
        .select(&FOOTER_SELECTOR)
        .find_map(|footer| parse_runtime(&footer.text().collect::<String>()));

    page
}
