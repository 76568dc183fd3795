use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use film_scraper::config::{Config, JobConfig};
use film_scraper::output::Diagnostics;
use film_scraper::runner::Fetchers;

#[derive(Debug, Parser)]
#[command(name = "film-scraper", version, about = "Scrape movie charts and lists into CSV files")]
struct Cli {
    /// TOML file layered over the built-in job definitions
    #[arg(short, long, env = "FILM_SCRAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Run only these jobs (repeatable); all jobs run when omitted
    #[arg(short, long = "job")]
    jobs: Vec<String>,

    /// List configured jobs and exit
    #[arg(long)]
    list: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("film_scraper=info".parse()?);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration; any problem here stops the run before output exists
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(cli.log_json || config.log_json)?;

    if cli.list {
        for job in &config.jobs {
            println!("{:<24} {:<16} -> {}", job.name, job.site.key(), job.output_file);
        }
        return Ok(());
    }

    let jobs: Vec<&JobConfig> = if cli.jobs.is_empty() {
        config.jobs.iter().collect()
    } else {
        cli.jobs
            .iter()
            .map(|name| config.job(name))
            .collect::<Result<_, _>>()?
    };

    let output_dir = config.prepare_output_dir()?;
    let mut diagnostics = match config.diagnostics_path() {
        Some(path) => Diagnostics::open(&path)?,
        None => Diagnostics::disabled(),
    };
    let fetchers = Fetchers::for_jobs(&config, &jobs)?;

    info!(
        "Starting {} job(s) at {}",
        jobs.len(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    // Jobs run one after another; a failed job does not stop the rest
    let mut failed = 0;
    for job in &jobs {
        match fetchers
            .run(job, config.page_delay_ms, &output_dir, &mut diagnostics)
            .await
        {
            Ok(summary) => info!(
                "Job {} finished: {} films in {} page(s)",
                summary.job, summary.written, summary.report.pages_visited
            ),
            Err(e) => {
                failed += 1;
                error!("Job {} failed: {:#}", job.name, e);
                diagnostics.warn(format!("Job {} failed: {}", job.name, e));
            }
        }
    }

    info!("All jobs finished ({} failed)", failed);
    if let Some(path) = diagnostics.path() {
        info!("Diagnostics appended to {}", path.display());
    }
    Ok(())
}
