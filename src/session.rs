//! Browser session management.
//!
//! Extractors that need a rendered, JavaScript-driven page talk to a
//! [`Browser`]; sessions come from a [`SessionManager`]. The production
//! implementation drives Chrome through a WebDriver server with `fantoccini`.
//!
//! # Lifecycle
//!
//! Every extractor opens its own session and releases it before returning,
//! so a broken page in one source cannot leave state behind for the next.
//! [`with_session`] pairs `acquire` with `quit` on every exit path; a
//! [`WebDriverSession`] dropped without `quit` (panic, cancelled future)
//! closes itself in the background.

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::utils::normalize_text;
use fantoccini::{Client, ClientBuilder, Locator};
use itertools::Itertools;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// One live browser window with a single tab.
///
/// Navigation methods take `&mut self`: the tab's current page is shared
/// state that every call may replace.
pub trait Browser {
    /// Navigate the tab to `url`.
    async fn visit(&mut self, url: &str) -> Result<()>;

    /// Block until an element matching `css` is present on the current page.
    ///
    /// Times out as [`ScrapeError::Structure`].
    async fn wait_for(&mut self, css: &str) -> Result<()>;

    /// Rendered HTML of the current page.
    async fn html(&mut self) -> Result<String>;

    /// URL of the current page, after any redirects or clicks.
    async fn current_url(&mut self) -> Result<Url>;

    /// Click the first link whose visible text contains `text`.
    async fn click_link_by_partial_text(&mut self, text: &str) -> Result<()>;

    /// Close the window and end the session.
    async fn quit(self) -> Result<()>;
}

/// Opens browser sessions.
pub trait SessionManager {
    type Session: Browser;

    /// Open a new session. Failure here is an environment failure.
    async fn acquire(&self) -> Result<Self::Session>;
}

/// Run `f` inside a fresh session and release the session afterwards.
///
/// The session is quit whether `f` succeeds or fails; a failing quit is
/// logged and does not mask `f`'s result.
#[instrument(level = "debug", skip(manager, f))]
pub async fn with_session<M, T>(
    manager: &M,
    source: &str,
    f: impl AsyncFnOnce(&mut M::Session) -> Result<T>,
) -> Result<T>
where
    M: SessionManager,
{
    let mut session = manager.acquire().await?;
    debug!(source, "Browser session opened");

    let outcome = f(&mut session).await;

    match session.quit().await {
        Ok(()) => debug!(source, "Browser session released"),
        Err(e) => warn!(source, error = %e, "Failed to release browser session"),
    }
    outcome
}

/// Quote `s` as an XPath string literal.
///
/// XPath 1.0 has no escape sequences, so text holding both quote kinds is
/// split on `'` and stitched back together with `concat()`.
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    let parts = s.split('\'').map(|part| format!("'{part}'")).join(", \"'\", ");
    format!("concat({parts})")
}

/// XPath matching links whose whitespace-normalised text contains `text`.
fn partial_link_xpath(text: &str) -> String {
    format!(
        "//a[contains(normalize-space(.), {})]",
        xpath_literal(&normalize_text(text))
    )
}

/// Opens Chrome sessions against a WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverSessions {
    webdriver_url: String,
    headless: bool,
    wait_timeout: Duration,
}

impl WebDriverSessions {
    pub fn new(config: &Config) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            headless: config.headless,
            wait_timeout: config.wait_timeout(),
        }
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = vec!["--window-size=1280,1024"];
        if self.headless {
            args.push("--headless=new");
        }
        let mut caps = serde_json::Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }
}

impl SessionManager for WebDriverSessions {
    type Session = WebDriverSession;

    #[instrument(level = "info", skip(self), fields(webdriver = %self.webdriver_url, headless = self.headless))]
    async fn acquire(&self) -> Result<WebDriverSession> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        let client = builder
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| ScrapeError::Session(e.to_string()))?;

        info!("WebDriver session started");
        Ok(WebDriverSession {
            client: Some(client),
            wait_timeout: self.wait_timeout,
        })
    }
}

/// A live WebDriver session.
#[derive(Debug)]
pub struct WebDriverSession {
    client: Option<Client>,
    wait_timeout: Duration,
}

impl WebDriverSession {
    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| ScrapeError::Browser("session already closed".to_string()))
    }
}

impl Browser for WebDriverSession {
    #[instrument(level = "debug", skip(self))]
    async fn visit(&mut self, url: &str) -> Result<()> {
        self.client()?
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Browser(format!("goto {url}: {e}")))
    }

    #[instrument(level = "debug", skip(self))]
    async fn wait_for(&mut self, css: &str) -> Result<()> {
        self.client()?
            .wait()
            .at_most(self.wait_timeout)
            .for_element(Locator::Css(css))
            .await
            .map(|_| ())
            .map_err(|e| ScrapeError::Structure(format!("waiting for '{css}': {e}")))
    }

    async fn html(&mut self) -> Result<String> {
        self.client()?
            .source()
            .await
            .map_err(|e| ScrapeError::Browser(format!("page source: {e}")))
    }

    async fn current_url(&mut self) -> Result<Url> {
        self.client()?
            .current_url()
            .await
            .map_err(|e| ScrapeError::Browser(format!("current url: {e}")))
    }

    #[instrument(level = "debug", skip(self))]
    async fn click_link_by_partial_text(&mut self, text: &str) -> Result<()> {
        let xpath = partial_link_xpath(text);
        let link = self
            .client()?
            .find(Locator::XPath(&xpath))
            .await
            .map_err(|_| ScrapeError::Navigation(text.to_string()))?;
        link.click()
            .await
            .map_err(|e| ScrapeError::Browser(format!("click '{text}': {e}")))
    }

    async fn quit(mut self) -> Result<()> {
        match self.client.take() {
            Some(client) => client
                .close()
                .await
                .map_err(|e| ScrapeError::Browser(format!("close: {e}"))),
            None => Ok(()),
        }
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        warn!("Browser session dropped without release; closing in background");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = client.close().await {
                    warn!(error = %e, "Background close of browser session failed");
                }
            });
        }
    }
}
