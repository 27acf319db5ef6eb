//! JPL featured space image scraper.
//!
//! The Mars-filtered image search renders a grid of thumbnails. The first
//! thumbnail is the featured image; its full-size JPEG lives under a separate
//! base path keyed by the identifier embedded in the thumbnail file name.

use crate::config::FeaturedImageSource;
use crate::error::Result;
use crate::session::Browser;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

static THUMBNAIL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.img img[src]").unwrap());

/// Every thumbnail `src` in the results grid, in page order.
pub fn parse_thumbnails(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&THUMBNAIL)
        .filter_map(|img| img.value().attr("src"))
        .map(str::to_string)
        .collect()
}

/// Derive the full-size image URL from a thumbnail reference.
///
/// The identifier is the final path segment up to the first `-` (the
/// size/style suffix), or up to the extension when there is no suffix.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     full_size_url("/spaceimages/images/wallpaper/PIA23498-640x350.jpg", "https://photojournal.jpl.nasa.gov/jpeg/"),
///     Some("https://photojournal.jpl.nasa.gov/jpeg/PIA23498.jpg".to_string())
/// );
/// ```
pub fn full_size_url(thumbnail: &str, full_size_base: &str) -> Option<String> {
    let path = thumbnail.split(['?', '#']).next().unwrap_or(thumbnail);
    let segment = path.rsplit('/').next()?;
    let stem = segment.split('-').next()?;
    let id = stem.split('.').next()?;
    if id.is_empty() {
        return None;
    }
    Some(format!("{}/{}.jpg", full_size_base.trim_end_matches('/'), id))
}

/// Scrape the featured image's full-size URL; empty when no thumbnail exists.
#[instrument(level = "info", skip_all, fields(url = %source.search_url))]
pub async fn extract<B: Browser>(browser: &mut B, source: &FeaturedImageSource) -> Result<String> {
    browser.visit(&source.search_url).await?;
    if let Err(e) = browser.wait_for("div.img img").await {
        warn!(error = %e, "Image grid did not render");
        return Ok(String::new());
    }
    let html = browser.html().await?;

    let thumbnails = parse_thumbnails(&html);
    debug!(count = thumbnails.len(), "Collected image thumbnails");

    let Some(first) = thumbnails.first() else {
        warn!("No image thumbnails found");
        return Ok(String::new());
    };

    match full_size_url(first, &source.full_size_base) {
        Some(url) => {
            info!(%url, "Derived featured image URL");
            Ok(url)
        }
        None => {
            warn!(thumbnail = %first, "Thumbnail carries no image identifier");
            Ok(String::new())
        }
    }
}
