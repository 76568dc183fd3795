use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::Site;
use crate::pipeline::PagePlan;

pub const DEFAULT_CONFIG_NAME: &str = "film_scraper";
pub const ENV_PREFIX: &str = "FILM_SCRAPER";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub user_agent: String,
    /// Fixed per-request timeout; a timeout counts as a failed page.
    pub request_timeout_secs: u64,
    pub page_delay_ms: DelayRange,
    pub output_dir: PathBuf,
    /// Shared append-only diagnostics file, relative to `output_dir`.
    pub diagnostics_file: Option<String>,
    pub log_json: bool,
    pub jobs: Vec<JobConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub fn none() -> Self {
        Self { min: 0, max: 0 }
    }

    pub fn pick(&self) -> Duration {
        use rand::Rng;

        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if low == high {
            return Duration::from_millis(low);
        }
        Duration::from_millis(rand::thread_rng().gen_range(low..=high))
    }
}

/// Output ordering. Always chosen explicitly per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Whole-chart mode: sort the accepted records by rank.
    RankSorted,
    /// Incremental list mode: keep acceptance order.
    OriginalOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    Static,
    Browser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub site: Site,
    pub pages: PagePlan,
    pub output_file: String,
    /// Cap on accepted records; `None` runs until the pages run out.
    pub target_count: Option<usize>,
    pub min_popularity: Option<u64>,
    pub rank_ceiling: Option<u32>,
    /// Minutes; films shorter than this, or with no known runtime, are rejected.
    #[serde(default)]
    pub min_runtime: Option<u32>,
    #[serde(default)]
    pub require_external_id: bool,
    pub order: OrderPolicy,
    pub include_id: bool,
    pub fetch_mode: FetchMode,
    /// Fetch each film's detail page for year, id and rating count.
    pub enrich: bool,
    pub rejections_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 25,
            page_delay_ms: DelayRange { min: 1000, max: 1500 },
            output_dir: PathBuf::from("Outputs"),
            diagnostics_file: Some("All_Outputs.csv".to_string()),
            log_json: false,
            jobs: default_jobs(),
        }
    }
}

fn box_office_job(name: &str, base_url: &str, output_file: &str) -> JobConfig {
    JobConfig {
        name: name.to_string(),
        site: Site::BoxOfficeMojo,
        pages: PagePlan::Offsets {
            base_url: base_url.to_string(),
            param: "offset".to_string(),
            step: 200,
            pages: 2,
        },
        output_file: output_file.to_string(),
        target_count: Some(250),
        min_popularity: None,
        rank_ceiling: Some(250),
        min_runtime: None,
        require_external_id: false,
        order: OrderPolicy::RankSorted,
        include_id: false,
        fetch_mode: FetchMode::Static,
        enrich: false,
        rejections_file: None,
    }
}

fn letterboxd_films_job(name: &str, base_url: &str, output_file: &str, target: usize) -> JobConfig {
    JobConfig {
        name: name.to_string(),
        site: Site::Letterboxd,
        pages: PagePlan::Numbered {
            base_url: base_url.to_string(),
            max_pages: None,
        },
        output_file: output_file.to_string(),
        target_count: Some(target),
        min_popularity: Some(1000),
        rank_ceiling: None,
        min_runtime: Some(40),
        require_external_id: true,
        order: OrderPolicy::OriginalOrder,
        include_id: true,
        fetch_mode: FetchMode::Static,
        enrich: true,
        rejections_file: Some(format!("rejected_{}", output_file)),
    }
}

fn default_jobs() -> Vec<JobConfig> {
    vec![
        box_office_job(
            "box_office_real",
            "https://www.boxofficemojo.com/chart/ww_top_lifetime_gross/?area=XWW",
            "box_office_real.csv",
        ),
        box_office_job(
            "box_office_inflated",
            "https://www.boxofficemojo.com/chart/top_lifetime_gross_adjusted/?adjust_gross_to=2022",
            "box_office_inflated.csv",
        ),
        letterboxd_films_job(
            "popular_films",
            "https://letterboxd.com/films/popular/",
            "popular_films.csv",
            2500,
        ),
        letterboxd_films_job(
            "top_rated_films",
            "https://letterboxd.com/films/by/rating/",
            "top_rated_films.csv",
            250,
        ),
        JobConfig {
            name: "list_titles".to_string(),
            site: Site::Letterboxd,
            pages: PagePlan::Numbered {
                base_url: "https://letterboxd.com/dave/list/official-top-250-narrative-feature-films/"
                    .to_string(),
                max_pages: None,
            },
            output_file: "film_titles.csv".to_string(),
            target_count: None,
            min_popularity: None,
            rank_ceiling: None,
            min_runtime: None,
            require_external_id: false,
            order: OrderPolicy::OriginalOrder,
            include_id: false,
            fetch_mode: FetchMode::Static,
            // Film pages carry the year the list markup often lacks
            enrich: true,
            rejections_file: None,
        },
    ]
}

impl Config {
    /// Built-in defaults, then `path` (or an optional `film_scraper.toml` in
    /// the working directory), then `FILM_SCRAPER__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&Config::default())?;

        let mut builder = config::Config::builder().add_source(defaults);
        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for job in &self.jobs {
            job.pages
                .validate()
                .map_err(|(url, source)| ConfigError::InvalidUrl {
                    job: job.name.clone(),
                    url,
                    source,
                })?;
        }
        Ok(())
    }

    pub fn job(&self, name: &str) -> Result<&JobConfig, ConfigError> {
        self.jobs
            .iter()
            .find(|job| job.name == name)
            .ok_or_else(|| ConfigError::UnknownJob(name.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Create the output directory up front so an unusable path fails the
    /// run before anything is scraped.
    pub fn prepare_output_dir(&self) -> Result<PathBuf, ConfigError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ConfigError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;
        Ok(self.output_dir.clone())
    }

    pub fn diagnostics_path(&self) -> Option<PathBuf> {
        self.diagnostics_file
            .as_ref()
            .map(|file| self.output_dir.join(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_every_site() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.jobs.iter().any(|j| j.site == Site::BoxOfficeMojo));
        assert!(config.jobs.iter().any(|j| j.site == Site::Letterboxd));

        let chart = config.job("box_office_real").unwrap();
        assert_eq!(chart.order, OrderPolicy::RankSorted);
        assert_eq!(chart.rank_ceiling, Some(250));
        assert!(config.job("missing").is_err());

        let popular = config.job("popular_films").unwrap();
        assert_eq!(popular.min_runtime, Some(40));
        assert!(popular.require_external_id);
        assert!(config.job("list_titles").unwrap().enrich);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
request_timeout_secs = 5
output_dir = "out"

[[jobs]]
name = "mini"
site = "letterboxd"
output_file = "mini.csv"
target_count = 10
order = "original_order"
include_id = false
fetch_mode = "static"
enrich = false

[jobs.pages]
kind = "fixed"
urls = ["https://letterboxd.com/films/popular/"]
"#
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);

        let job = config.job("mini").unwrap();
        assert_eq!(job.target_count, Some(10));
        assert_eq!(job.min_popularity, None);
        assert_eq!(job.min_runtime, None);
        assert!(!job.require_external_id);
        assert!(matches!(job.pages, PagePlan::Fixed { .. }));
    }

    #[test]
    fn unusable_output_dir_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let config = Config {
            output_dir: blocker.join("nested"),
            ..Config::default()
        };
        assert!(matches!(
            config.prepare_output_dir(),
            Err(ConfigError::OutputDir { .. })
        ));
    }

    #[test]
    fn delay_range_bounds() {
        assert_eq!(DelayRange::none().pick(), Duration::ZERO);
        let range = DelayRange { min: 20, max: 10 };
        let picked = range.pick();
        assert!(picked >= Duration::from_millis(10) && picked <= Duration::from_millis(20));
    }
}
