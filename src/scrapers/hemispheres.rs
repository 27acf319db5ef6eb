//! USGS Astrogeology hemisphere image scraper.
//!
//! The search results list the enhanced hemisphere mosaics. Each item's
//! full-resolution download link only appears on its detail page, reached by
//! clicking the item's title; the page offers a "Back" link to the results.
//!
//! The browser has one tab, so the walk is a small state machine:
//!
//! ```text
//!            select_item(title)
//! AtListing ───────────────────▶ AtDetail
//!     ▲                              │
//!     └──────────── go_back ─────────┘
//! ```
//!
//! Every iteration starts from `AtListing`. An item whose detail page cannot
//! be reached or lacks a download link is skipped; the walk always returns
//! to the listing before the next item so output order follows the listing.

use crate::config::HemisphereSource;
use crate::error::{Result, ScrapeError};
use crate::models::{Hemisphere, MAX_HEMISPHERES};
use crate::session::Browser;
use crate::utils::element_text;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

static ITEM_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result-list div.item div.description a").unwrap());
static DOWNLOAD_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.downloads ul li a[href]").unwrap());

const LISTING_READY: &str = "div.result-list div.item";
const DETAIL_READY: &str = "div.downloads";
const ENHANCED_SUFFIX: &str = " Enhanced";
const BACK_LINK: &str = "Back";

/// Item titles in listing order, with the " Enhanced" marker removed.
pub fn parse_listing_titles(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&ITEM_TITLE)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .map(|t| strip_enhanced(&t).to_string())
        .collect()
}

/// Drop the site's " Enhanced" high-resolution marker from a title.
pub fn strip_enhanced(title: &str) -> &str {
    title.strip_suffix(ENHANCED_SUFFIX).unwrap_or(title)
}

/// The first download link on a detail page, resolved against `page_url`.
pub fn parse_download_url(html: &str, page_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&DOWNLOAD_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| page_url.join(href).ok())
        .map(|u| u.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GalleryState {
    AtListing,
    AtDetail,
}

/// The browser tab walking between the results listing and detail pages.
struct Gallery<'a, B> {
    browser: &'a mut B,
    listing_url: &'a str,
    state: GalleryState,
}

impl<'a, B: Browser> Gallery<'a, B> {
    /// Load the listing and return its item titles.
    async fn open(browser: &'a mut B, listing_url: &'a str) -> Result<(Self, Vec<String>)> {
        browser.visit(listing_url).await?;
        browser.wait_for(LISTING_READY).await?;
        let titles = parse_listing_titles(&browser.html().await?);

        let gallery = Self {
            browser,
            listing_url,
            state: GalleryState::AtListing,
        };
        Ok((gallery, titles))
    }

    async fn load_listing(&mut self) -> Result<()> {
        self.browser.visit(self.listing_url).await?;
        self.browser.wait_for(LISTING_READY).await?;
        self.state = GalleryState::AtListing;
        Ok(())
    }

    /// AtListing → AtDetail. Leaves the state unchanged when the link is missing.
    async fn select_item(&mut self, title: &str) -> Result<()> {
        debug_assert_eq!(self.state, GalleryState::AtListing);
        self.browser.click_link_by_partial_text(title).await?;
        self.state = GalleryState::AtDetail;
        Ok(())
    }

    async fn read_download_url(&mut self) -> Result<String> {
        self.browser.wait_for(DETAIL_READY).await?;
        let html = self.browser.html().await?;
        let page_url = self.browser.current_url().await?;
        parse_download_url(&html, &page_url)
            .ok_or_else(|| ScrapeError::Structure("detail page has no download link".to_string()))
    }

    /// AtDetail → AtListing via the page's "Back" control, falling back to
    /// direct navigation when the control is missing.
    async fn go_back(&mut self) -> Result<()> {
        if self.state == GalleryState::AtListing {
            return Ok(());
        }
        let clicked = self.browser.click_link_by_partial_text(BACK_LINK).await;
        let waited = match clicked {
            Ok(()) => self.browser.wait_for(LISTING_READY).await,
            Err(e) => Err(e),
        };
        match waited {
            Ok(()) => self.state = GalleryState::AtListing,
            Err(e) => {
                warn!(error = %e, "Back navigation failed; reloading listing");
                self.load_listing().await?;
            }
        }
        Ok(())
    }

    /// Visit one item's detail page and read its image URL.
    async fn visit_item(&mut self, title: &str) -> Result<Hemisphere> {
        self.select_item(title).await?;
        let image_url = self.read_download_url().await?;
        Ok(Hemisphere {
            title: title.to_string(),
            image_url,
        })
    }
}

/// Scrape up to four hemisphere images in listing order.
///
/// Fails only when the listing itself cannot be loaded. If the tab cannot be
/// brought back to the listing between items, the items scraped so far are
/// returned.
#[instrument(level = "info", skip_all, fields(url = %source.listing_url))]
pub async fn extract<B: Browser>(browser: &mut B, source: &HemisphereSource) -> Result<Vec<Hemisphere>> {
    let (mut gallery, titles) = Gallery::open(browser, &source.listing_url).await?;
    info!(items = titles.len(), "Hemisphere listing loaded");

    let mut hemispheres = Vec::with_capacity(MAX_HEMISPHERES);
    for title in titles.iter().take(MAX_HEMISPHERES) {
        match gallery.visit_item(title).await {
            Ok(hemisphere) => {
                debug!(title = %hemisphere.title, url = %hemisphere.image_url, "Hemisphere scraped");
                hemispheres.push(hemisphere);
            }
            Err(e) => warn!(%title, error = %e, "Skipping hemisphere"),
        }
        if let Err(e) = gallery.go_back().await {
            warn!(error = %e, "Lost the hemisphere listing; stopping early");
            break;
        }
    }

    info!(count = hemispheres.len(), "Scraped hemisphere images");
    Ok(hemispheres)
}
