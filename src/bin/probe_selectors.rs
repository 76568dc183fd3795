use anyhow::{Context, Result};
use clap::Parser;
use scraper::{Html, Selector};
use std::fs;
use url::Url;

use film_scraper::config::Config;
use film_scraper::scrapers::source_for;
use film_scraper::utils::{HttpFetcher, PageFetcher};

/// Fetch a page and report how the known selectors match it.
#[derive(Debug, Parser)]
struct Args {
    /// Configured job whose first page is probed
    #[arg(long, conflicts_with = "url")]
    job: Option<String>,

    /// Probe this URL instead of a job page
    #[arg(long)]
    url: Option<String>,

    /// Save the fetched HTML here
    #[arg(long)]
    save: Option<String>,
}

const SELECTORS: &[&str] = &[
    "table.mojo-body-table tr",
    "td.mojo-field-type-rank",
    "td.mojo-field-type-title a",
    "td.mojo-field-type-year",
    "li.poster-container",
    "div.film-poster",
    "div.react-component.poster",
    "p.list-number",
    "a.next",
    r#"meta[property="og:title"]"#,
    "body[data-tmdb-id]",
    r#"script[type="application/ld+json"]"#,
];

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(None)?;

    let (url, job) = match (&args.url, &args.job) {
        (Some(url), _) => (Url::parse(url)?, None),
        (None, Some(name)) => {
            let job = config.job(name)?;
            let url = job.pages.url_for(1).context("job has no first page")?;
            (url, Some(job))
        }
        (None, None) => anyhow::bail!("pass --job or --url"),
    };

    let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout())?;
    println!("Fetching {}...", url);
    let html = fetcher.fetch(&url).await?;
    if let Some(path) = &args.save {
        fs::write(path, &html)?;
        println!("Saved {} bytes to {}", html.len(), path);
    }

    let document = Html::parse_document(&html);
    for selector_str in SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            let count = document.select(&selector).count();
            if count > 0 {
                println!("Selector '{}' matched {} elements", selector_str, count);
            }
        }
    }

    if let Some(job) = job {
        let extract = source_for(job).extract(&html, &url);
        println!(
            "\n{} candidates, {} skipped rows, next page: {:?}",
            extract.candidates.len(),
            extract.skipped.len(),
            extract.next_page
        );
        for candidate in extract.candidates.iter().take(5) {
            println!("  {:?} {}", candidate.rank, candidate.label());
        }
        for reason in extract.skipped.iter().take(5) {
            println!("  skipped: {}", reason);
        }
    }

    Ok(())
}
