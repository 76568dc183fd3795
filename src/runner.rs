use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{Config, DelayRange, FetchMode, JobConfig};
use crate::error::ConfigError;
use crate::models::EMOJI_SAVED;
use crate::output::{write_rejections, CsvWriter, Diagnostics};
use crate::pipeline::{DetailRules, PaginationDriver, RunReport, RunState};
use crate::scrapers::source_for;
use crate::utils::{HttpFetcher, PageFetcher};

#[cfg(feature = "browser")]
use crate::utils::browser::BrowserFetcher;

/// What one job produced.
#[derive(Debug)]
pub struct JobSummary {
    pub job: String,
    pub output: PathBuf,
    pub written: usize,
    pub rejections: Option<PathBuf>,
    pub report: RunReport,
}

/// The fetchers a set of jobs needs, built before anything runs so a missing
/// browser is reported up front.
pub struct Fetchers {
    http: HttpFetcher,
    #[cfg(feature = "browser")]
    browser: Option<BrowserFetcher>,
}

impl Fetchers {
    pub fn for_jobs(config: &Config, jobs: &[&JobConfig]) -> Result<Self, ConfigError> {
        let http = HttpFetcher::new(&config.user_agent, config.request_timeout())?;
        let browser_job = jobs.iter().find(|job| job.fetch_mode == FetchMode::Browser);

        #[cfg(feature = "browser")]
        {
            let browser = match browser_job {
                Some(_) => Some(BrowserFetcher::launch(config.request_timeout())?),
                None => None,
            };
            Ok(Self { http, browser })
        }

        #[cfg(not(feature = "browser"))]
        {
            match browser_job {
                Some(job) => Err(ConfigError::BrowserUnavailable(job.name.clone())),
                None => Ok(Self { http }),
            }
        }
    }

    /// Run `job` with the fetcher its fetch mode asks for.
    pub async fn run(
        &self,
        job: &JobConfig,
        delay: DelayRange,
        output_dir: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<JobSummary> {
        match job.fetch_mode {
            FetchMode::Static => run_job(job, &self.http, delay, output_dir, diagnostics).await,
            #[cfg(feature = "browser")]
            FetchMode::Browser => {
                let browser = self
                    .browser
                    .as_ref()
                    .ok_or_else(|| ConfigError::BrowserUnavailable(job.name.clone()))?
                    .waiting_for(source_for(job).ready_selector());
                run_job(job, &browser, delay, output_dir, diagnostics).await
            }
            #[cfg(not(feature = "browser"))]
            FetchMode::Browser => Err(ConfigError::BrowserUnavailable(job.name.clone()).into()),
        }
    }
}

/// Scrape every page of `job`, then write its CSV (and rejection report).
pub async fn run_job(
    job: &JobConfig,
    fetcher: &dyn PageFetcher,
    delay: DelayRange,
    output_dir: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<JobSummary> {
    let source = source_for(job);
    diagnostics.note(format!(
        "{:=^100}",
        format!(" {} ({}, {} fetcher) ", job.name, source.site(), fetcher.kind())
    ));

    let state = RunState::new(job.target_count, job.min_popularity, job.rank_ceiling).with_details(
        DetailRules {
            min_runtime: job.min_runtime,
            require_external_id: job.require_external_id,
        },
    );
    let driver = PaginationDriver::new(
        source.as_ref(),
        fetcher,
        &job.pages,
        job.order,
        delay,
        diagnostics,
    );
    let report = driver.run(state).await;

    let output = output_dir.join(&job.output_file);
    let written = CsvWriter::new(job.include_id)
        .write(&output, &report.records)
        .with_context(|| format!("Error writing results of job '{}'", job.name))?;
    diagnostics.note(format!(
        "{} Successfully wrote {} films to {}",
        EMOJI_SAVED,
        written,
        output.display()
    ));

    let rejections = match &job.rejections_file {
        Some(file) => {
            let path = output_dir.join(file);
            let count = write_rejections(&path, &report.state.rejected)
                .with_context(|| format!("Error writing rejections of job '{}'", job.name))?;
            info!("Wrote {} rejected films to {}", count, path.display());
            Some(path)
        }
        None => None,
    };

    Ok(JobSummary {
        job: job.name.clone(),
        output,
        written,
        rejections,
        report,
    })
}
