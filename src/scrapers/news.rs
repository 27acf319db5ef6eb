//! NASA Mars News scraper.
//!
//! The listing page is rendered in the browser; the headline and rollover
//! summary come from the first article tile. The first article's own page is
//! then fetched over plain HTTP for its opening paragraph.

use crate::config::NewsSource;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::NewsFragment;
use crate::session::Browser;
use crate::utils::{element_text, truncate_for_log};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.bottom_gradient").unwrap());
static SUMMARY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.rollover_description_inner").unwrap());
static ARTICLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".content_title a[href]").unwrap());
static BODY_PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".wysiwyg_content p").unwrap());

/// What the listing page yields before the article is fetched.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Listing {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub article_url: Option<Url>,
}

/// Parse the news listing, resolving the first article link against `base`.
pub fn parse_listing(html: &str, base: &Url) -> Listing {
    let document = Html::parse_document(html);

    let first_text = |selector: &Selector| {
        document
            .select(selector)
            .map(element_text)
            .find(|t| !t.is_empty())
    };

    let article_url = document
        .select(&ARTICLE_LINK)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| base.join(href).ok());

    Listing {
        title: first_text(&TITLE),
        summary: first_text(&SUMMARY),
        article_url,
    }
}

/// First non-empty paragraph of the article body.
pub fn parse_first_paragraph(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&BODY_PARAGRAPH)
        .map(element_text)
        .find(|p| !p.is_empty())
}

/// Scrape the latest headline, summary and article paragraph.
///
/// Any marker missing from either page leaves that field empty. Errors are
/// returned only when the browser itself fails or the base URL is invalid.
#[instrument(level = "info", skip_all, fields(url = %source.listing_url))]
pub async fn extract<B, F>(browser: &mut B, fetcher: &F, source: &NewsSource) -> Result<NewsFragment>
where
    B: Browser,
    F: Fetcher,
{
    let base = Url::parse(&source.base_url)?;

    browser.visit(&source.listing_url).await?;
    if let Err(e) = browser.wait_for(".content_title").await {
        warn!(error = %e, "News listing did not finish rendering; parsing what is there");
    }
    let html = browser.html().await?;
    let listing = parse_listing(&html, &base);

    if listing.title.is_none() {
        warn!("News title marker missing");
    }
    if listing.summary.is_none() {
        warn!("News summary marker missing");
    }

    let body_paragraph = match &listing.article_url {
        Some(url) => match fetcher.fetch_text(url.as_str()).await {
            Ok(article) => parse_first_paragraph(&article).unwrap_or_else(|| {
                warn!(%url, "Article has no body paragraphs");
                String::new()
            }),
            Err(e) => {
                warn!(%url, error = %e, "Article fetch failed");
                String::new()
            }
        },
        None => {
            warn!("No article link on news listing");
            String::new()
        }
    };

    let fragment = NewsFragment {
        title: listing.title.unwrap_or_default(),
        summary: listing.summary.unwrap_or_default(),
        body_paragraph,
    };
    info!(title = %fragment.title, "Scraped Mars news");
    debug!(paragraph = %truncate_for_log(&fragment.body_paragraph, 120), "News paragraph");
    Ok(fragment)
}
