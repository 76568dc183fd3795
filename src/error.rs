use std::path::PathBuf;
use thiserror::Error;

/// Transport failures. The pagination driver treats any of these as an empty
/// page; none of them abort a run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("browser error: {0}")]
    Browser(String),
}

impl FetchError {
    pub fn from_reqwest_error(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Problems that stop the program before any output is produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("output directory {path} is not usable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("job '{job}' has an invalid url '{url}': {source}")]
    InvalidUrl {
        job: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("job '{0}' is not configured")]
    UnknownJob(String),

    #[error("job '{0}' needs the browser fetcher, but this build lacks the `browser` feature")]
    BrowserUnavailable(String),

    #[error("failed to start the browser: {0}")]
    BrowserLaunch(String),

    #[error("http client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}
