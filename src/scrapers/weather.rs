//! Mars weather report scraper.
//!
//! The weather account's feed mixes daily reports with other posts. Reports
//! start with the Martian day, e.g. `Sol 4205 (2024-06-07), Sunny, ...`.

use crate::config::WeatherSource;
use crate::error::Result;
use crate::session::Browser;
use crate::utils::{element_text, truncate_for_log};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

static POST_TEXT: Lazy<Selector> = Lazy::new(|| Selector::parse("p.tweet-text").unwrap());

const REPORT_PREFIX: &str = "Sol";

/// Trimmed text of every post, in page order (newest first).
pub fn parse_posts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document.select(&POST_TEXT).map(element_text).collect()
}

/// The most recent post that is a weather report.
///
/// `posts` must be ordered most recent first.
pub fn select_report(posts: &[String]) -> Option<&str> {
    posts
        .iter()
        .map(|p| p.trim())
        .find(|p| p.starts_with(REPORT_PREFIX))
}

/// Scrape the latest weather report; empty when the feed has none.
#[instrument(level = "info", skip_all, fields(url = %source.feed_url))]
pub async fn extract<B: Browser>(browser: &mut B, source: &WeatherSource) -> Result<String> {
    browser.visit(&source.feed_url).await?;
    if let Err(e) = browser.wait_for("p.tweet-text").await {
        warn!(error = %e, "Weather feed did not render any posts");
        return Ok(String::new());
    }
    let html = browser.html().await?;

    let posts = parse_posts(&html);
    debug!(count = posts.len(), "Collected feed posts");

    match select_report(&posts) {
        Some(report) => {
            info!(report = %truncate_for_log(report, 80), "Found weather report");
            Ok(report.to_string())
        }
        None => {
            warn!(posts = posts.len(), "No post starts with \"Sol\"");
            Ok(String::new())
        }
    }
}
