use async_trait::async_trait;
use std::fmt;
use url::Url;

use crate::config::JobConfig;
use crate::models::{CandidateRecord, Site};
use crate::utils::PageFetcher;

mod box_office_mojo;
mod letterboxd;

pub use box_office_mojo::BoxOfficeMojoScraper;
pub use letterboxd::{parse_film_page, FilmPage, LetterboxdScraper};

/// Whether the page itself says another page follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    Available,
    Exhausted,
    /// The page has no pagination affordance; the page plan decides.
    Unsignalled,
}

/// Why a row or a candidate was dropped. Skips are expected and never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingRank,
    InvalidRank(String),
    MissingTitle,
    MissingYear,
    MissingDetailPage,
    EnrichmentFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingRank => write!(f, "missing rank"),
            SkipReason::InvalidRank(raw) => write!(f, "non-numeric rank '{}'", raw),
            SkipReason::MissingTitle => write!(f, "missing title"),
            SkipReason::MissingYear => write!(f, "missing year"),
            SkipReason::MissingDetailPage => write!(f, "no film page link"),
            SkipReason::EnrichmentFailed(err) => write!(f, "film page unavailable: {}", err),
        }
    }
}

/// Everything one page yielded, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtract {
    pub candidates: Vec<CandidateRecord>,
    pub skipped: Vec<SkipReason>,
    pub next_page: NextPage,
}

impl PageExtract {
    /// What a failed fetch degrades to.
    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            skipped: Vec::new(),
            next_page: NextPage::Unsignalled,
        }
    }
}

#[async_trait]
pub trait FilmSource: Send + Sync {
    fn site(&self) -> Site;

    /// Parse one page into candidates. Tolerant: bad rows become skips.
    fn extract(&self, html: &str, page_url: &Url) -> PageExtract;

    /// Whether candidates need a detail-page fetch before filtering.
    fn enriches(&self) -> bool {
        false
    }

    /// Fill in fields only the detail page carries.
    async fn enrich(
        &self,
        candidate: CandidateRecord,
        _fetcher: &dyn PageFetcher,
    ) -> Result<CandidateRecord, SkipReason> {
        Ok(candidate)
    }

    /// Selector a script-executing fetcher should wait for.
    fn ready_selector(&self) -> Option<&'static str> {
        None
    }
}

pub fn source_for(job: &JobConfig) -> Box<dyn FilmSource> {
    match job.site {
        Site::BoxOfficeMojo => Box::new(BoxOfficeMojoScraper::new()),
        Site::Letterboxd => Box::new(LetterboxdScraper::new(job.enrich)),
    }
}
