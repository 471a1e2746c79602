use crate::config::ResolvedConfig;
use crate::constants::{BROWSER_ARGS, CLICK_POLL_MS};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Browser operations the download workflow needs from the portal.
///
/// One session covers one access code: `open`, `submit_code`, a series of
/// `click_when_ready`, then `close`.
#[async_trait]
pub trait Portal: Send {
    /// Starts a browser session downloading into the configured directory and loads `url`.
    async fn open(&mut self, url: &Url) -> AppResult<()>;

    /// Types `code` into the input matched by the CSS `selector` and submits it.
    async fn submit_code(&mut self, selector: &str, code: &str) -> AppResult<()>;

    /// Clicks the element at `xpath` once it can be clicked.
    ///
    /// # Errors
    ///
    /// Returns `ElementTimeout` if the element is still missing or not clickable
    /// after `timeout`.
    async fn click_when_ready(&mut self, xpath: &str, timeout: Duration) -> AppResult<()>;

    /// Tears the session down. Calling it without an open session is a no-op.
    async fn close(&mut self) -> AppResult<()>;
}

struct Session {
    browser: Browser,
    page: Page,
    events: JoinHandle<()>,
}

/// [`Portal`] backed by a Chromium instance driven over CDP.
pub struct ChromiumPortal {
    download_dir: PathBuf,
    headless: bool,
    chrome_executable: Option<PathBuf>,
    session: Option<Session>,
}

impl ChromiumPortal {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            download_dir: config.download_dir.clone(),
            headless: config.headless,
            chrome_executable: config.chrome_executable.clone(),
            session: None,
        }
    }

    fn page(&self) -> AppResult<&Page> {
        self.session
            .as_ref()
            .map(|s| &s.page)
            .ok_or_else(|| AppError::BrowserError("No open browser session".into()))
    }

    fn browser_config(&self) -> AppResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        for arg in BROWSER_ARGS {
            builder = builder.arg(*arg);
        }
        builder.build().map_err(AppError::BrowserError)
    }
}

#[async_trait]
impl Portal for ChromiumPortal {
    async fn open(&mut self, url: &Url) -> AppResult<()> {
        if self.session.is_some() {
            self.close().await?;
        }

        // Chromium needs an absolute download path
        tokio::fs::create_dir_all(&self.download_dir).await?;
        let download_path = tokio::fs::canonicalize(&self.download_dir).await?;

        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler error");
                }
            }
        });

        let params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(download_path.to_string_lossy().into_owned())
            .build()
            .map_err(AppError::BrowserError)?;
        browser.execute(params).await?;

        let page = browser.new_page(url.as_str()).await?;

        info!(
            url = %url,
            download_dir = %download_path.display(),
            "Browser session opened"
        );

        self.session = Some(Session {
            browser,
            page,
            events,
        });
        Ok(())
    }

    async fn submit_code(&mut self, selector: &str, code: &str) -> AppResult<()> {
        let page = self.page()?;
        let input = page.find_element(selector).await.map_err(|e| {
            AppError::BrowserError(format!("Code input '{selector}' not found: {e}"))
        })?;

        input
            .click()
            .await?
            .type_str(code)
            .await?
            .press_key("Enter")
            .await?;
        page.wait_for_navigation().await?;

        debug!(code = code, "Access code submitted");
        Ok(())
    }

    async fn click_when_ready(&mut self, xpath: &str, timeout: Duration) -> AppResult<()> {
        let page = self.page()?;
        let started = Instant::now();

        loop {
            let attempt = match page.find_xpath(xpath).await {
                Ok(element) => element.click().await.map(|_| ()),
                Err(e) => Err(e),
            };

            match attempt {
                Ok(()) => {
                    debug!(xpath = xpath, "Clicked download link");
                    return Ok(());
                }
                Err(e) => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        return Err(AppError::ElementTimeout {
                            xpath: xpath.to_string(),
                            waited,
                        });
                    }
                    debug!(xpath = xpath, error = %e, "Element not clickable yet");
                    tokio::time::sleep(Duration::from_millis(CLICK_POLL_MS)).await;
                }
            }
        }
    }

    async fn close(&mut self) -> AppResult<()> {
        let Some(Session {
            mut browser,
            page,
            events,
        }) = self.session.take()
        else {
            return Ok(());
        };

        if let Err(e) = page.close().await {
            warn!(error = %e, "Failed to close page");
        }
        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close browser");
        }
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "Failed to wait for browser exit");
        }
        events.abort();

        debug!("Browser session closed");
        Ok(())
    }
}
