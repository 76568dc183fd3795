use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{ConfigError, FetchError};
use crate::utils::http::PageFetcher;

/// Script-executing fetcher for pages that render their listings client-side.
pub struct BrowserFetcher {
    browser: Browser,
    timeout: Duration,
    /// Selector that must exist before the page counts as loaded.
    wait_for: Option<String>,
}

impl BrowserFetcher {
    pub fn launch(timeout: Duration) -> Result<Self, ConfigError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((1920, 1080)))
            .idle_browser_timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ConfigError::BrowserLaunch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| ConfigError::BrowserLaunch(e.to_string()))?;

        info!("Headless browser launched");
        Ok(Self {
            browser,
            timeout,
            wait_for: None,
        })
    }

    /// Same browser, waiting for a different selector.
    pub fn waiting_for(&self, selector: Option<&str>) -> Self {
        Self {
            browser: self.browser.clone(),
            timeout: self.timeout,
            wait_for: selector.map(str::to_string),
        }
    }
}

/// Closes its tab when dropped, whichever way the fetch ended.
struct TabGuard(Arc<Tab>);

impl Drop for TabGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.close(true) {
            debug!("Failed to close browser tab: {}", e);
        }
    }
}

fn load_page(tab: &Tab, target: &str, wait_for: Option<&str>, timeout: Duration) -> Result<String, FetchError> {
    tab.set_default_timeout(timeout);
    tab.navigate_to(target)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| FetchError::Browser(e.to_string()))?;

    if let Some(selector) = wait_for {
        tab.wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| FetchError::Browser(format!("{} never appeared: {}", selector, e)))?;
    }

    tab.get_content().map_err(|e| FetchError::Browser(e.to_string()))
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let browser = self.browser.clone();
        let timeout = self.timeout;
        let wait_for = self.wait_for.clone();
        let target = url.to_string();

        // headless_chrome is blocking
        tokio::task::spawn_blocking(move || {
            debug!("Navigating to {}", target);
            let tab = TabGuard(
                browser
                    .new_tab()
                    .map_err(|e| FetchError::Browser(e.to_string()))?,
            );
            load_page(&tab.0, &target, wait_for.as_deref(), timeout)
        })
        .await
        .map_err(|e| FetchError::Browser(e.to_string()))?
    }

    fn kind(&self) -> &'static str {
        "browser"
    }
}
