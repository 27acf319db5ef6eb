//! In-memory doubles for the browser and HTTP seams, plus page fixtures.
//!
//! [`FakeSessions`] hands out [`FakeBrowser`]s that serve pages from a
//! [`Site`] keyed by URL. Link clicks are resolved by parsing the current
//! page, so the hemisphere click-through runs against real markup.

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::fetch::Fetcher;
use crate::session::{Browser, SessionManager};
use crate::utils::element_text;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

fn canonical(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Pages keyed by canonical URL.
#[derive(Debug, Clone, Default)]
pub struct Site {
    pages: HashMap<String, String>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(canonical(url), html.into());
        self
    }

    fn get(&self, url: &str) -> Option<&String> {
        self.pages.get(&canonical(url))
    }
}

#[derive(Debug)]
pub struct FakeSessions {
    site: Arc<Site>,
    fail: bool,
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    visits: Arc<Mutex<Vec<String>>>,
}

impl FakeSessions {
    pub fn new(site: Site) -> Self {
        Self {
            site: Arc::new(site),
            fail: false,
            acquired: Arc::default(),
            released: Arc::default(),
            visits: Arc::default(),
        }
    }

    /// A manager whose every `acquire` fails like an unreachable driver.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Site::new())
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Every URL successfully navigated to, across all sessions, in order.
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }

    /// A standalone browser sharing this manager's site and visit log.
    pub fn browser(&self) -> FakeBrowser {
        FakeBrowser {
            site: Arc::clone(&self.site),
            current: None,
            released: Arc::clone(&self.released),
            visits: Arc::clone(&self.visits),
        }
    }
}

impl SessionManager for FakeSessions {
    type Session = FakeBrowser;

    async fn acquire(&self) -> Result<FakeBrowser> {
        if self.fail {
            return Err(ScrapeError::Session(
                "connection refused (localhost:9515)".to_string(),
            ));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(self.browser())
    }
}

#[derive(Debug)]
pub struct FakeBrowser {
    site: Arc<Site>,
    current: Option<String>,
    released: Arc<AtomicUsize>,
    visits: Arc<Mutex<Vec<String>>>,
}

impl FakeBrowser {
    fn current_html(&self) -> Result<&String> {
        self.current
            .as_deref()
            .and_then(|url| self.site.get(url))
            .ok_or_else(|| ScrapeError::Browser("no page loaded".to_string()))
    }

    fn find_link(&self, text: &str) -> Result<String> {
        let current = self
            .current
            .as_deref()
            .ok_or_else(|| ScrapeError::Browser("no page loaded".to_string()))?;
        let document = Html::parse_document(self.current_html()?);
        let links = Selector::parse("a[href]").unwrap();
        let href = document
            .select(&links)
            .find(|a| element_text(*a).contains(text))
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| ScrapeError::Navigation(text.to_string()))?;
        Ok(Url::parse(current)?.join(href)?.to_string())
    }
}

impl Browser for FakeBrowser {
    async fn visit(&mut self, url: &str) -> Result<()> {
        if self.site.get(url).is_none() {
            return Err(ScrapeError::Browser(format!("no page at {url}")));
        }
        self.current = Some(canonical(url));
        self.visits.lock().unwrap().push(canonical(url));
        Ok(())
    }

    async fn wait_for(&mut self, css: &str) -> Result<()> {
        let document = Html::parse_document(self.current_html()?);
        let selector = Selector::parse(css)
            .map_err(|e| ScrapeError::Structure(format!("bad selector '{css}': {e}")))?;
        if document.select(&selector).next().is_some() {
            Ok(())
        } else {
            Err(ScrapeError::Structure(format!("waiting for '{css}': timed out")))
        }
    }

    async fn html(&mut self) -> Result<String> {
        self.current_html().cloned()
    }

    async fn current_url(&mut self) -> Result<Url> {
        let current = self
            .current
            .as_deref()
            .ok_or_else(|| ScrapeError::Browser("no page loaded".to_string()))?;
        Ok(Url::parse(current)?)
    }

    async fn click_link_by_partial_text(&mut self, text: &str) -> Result<()> {
        let target = self.find_link(text)?;
        self.visit(&target).await
    }

    async fn quit(self) -> Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// [`Fetcher`] serving a fixed [`Site`]; unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct FakeFetcher {
    site: Site,
}

impl FakeFetcher {
    pub fn new(site: Site) -> Self {
        Self { site }
    }
}

impl Fetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.site.get(url).cloned().ok_or_else(|| ScrapeError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

// ---- fixtures ----

pub const ARTICLE_URL: &str =
    "https://mars.nasa.gov/news/8716/nasas-perseverance-rover-gets-its-wheels-and-air-brakes/";

pub const NEWS_TITLE: &str = "NASA's Perseverance Rover Gets Its Wheels and Air Brakes";
pub const NEWS_SUMMARY: &str = "After the rover was shipped from JPL to Kennedy Space Center, the team is getting closer to finalizing the spacecraft for launch.";
pub const NEWS_PARAGRAPH: &str = "The agency's next Mars rover is nearly ready for launch, with final preparations underway in Florida.";

pub const NEWS_LISTING_HTML: &str = r#"<html><body>
<ul class="item_list">
  <li class="slide">
    <div class="image_and_description_container">
      <div class="list_image"><img src="/system/news_items/list_view_images/8716_list.jpg"></div>
      <div class="bottom_gradient">
        <div><h3>NASA's Perseverance Rover Gets Its Wheels and Air Brakes</h3></div>
      </div>
      <div class="rollover_description">
        <div class="rollover_description_inner">
          After the rover was shipped from JPL to Kennedy Space Center,
          the team is getting closer to finalizing the spacecraft for launch.
        </div>
      </div>
    </div>
    <div class="list_text">
      <div class="list_date">June 15, 2020</div>
      <div class="content_title"><a href="/news/8716/nasas-perseverance-rover-gets-its-wheels-and-air-brakes/" target="_self">NASA's Perseverance Rover Gets Its Wheels and Air Brakes</a></div>
    </div>
  </li>
  <li class="slide">
    <div class="image_and_description_container">
      <div class="bottom_gradient"><div><h3>Older headline</h3></div></div>
      <div class="rollover_description"><div class="rollover_description_inner">Older summary</div></div>
    </div>
    <div class="list_text">
      <div class="content_title"><a href="/news/8715/older/">Older headline</a></div>
    </div>
  </li>
</ul>
</body></html>"#;

pub const NEWS_ARTICLE_HTML: &str = r#"<html><body>
<div class="wysiwyg_content">
  <p>   </p>
  <p>
    The agency's next Mars rover is nearly ready for launch,
    with final preparations underway in Florida.
  </p>
  <p>Engineers installed the wheels last week.</p>
</div>
</body></html>"#;

pub const FEATURED_IMAGE_URL: &str = "https://photojournal.jpl.nasa.gov/jpeg/PIA23498.jpg";

pub const IMAGE_SEARCH_HTML: &str = r#"<html><body>
<ul class="articles">
  <li class="slide"><a class="fancybox" data-fancybox-href="/spaceimages/images/mediumsize/PIA23498_ip.jpg">
    <div class="image_and_description_container"><div class="img">
      <img alt="Mars at dusk" class="thumb" src="/spaceimages/images/wallpaper/PIA23498-640x350.jpg">
    </div></div></a></li>
  <li class="slide"><a class="fancybox">
    <div class="image_and_description_container"><div class="img">
      <img alt="Jezero" class="thumb" src="/spaceimages/images/wallpaper/PIA23497-640x350.jpg">
    </div></div></a></li>
</ul>
</body></html>"#;

pub const WEATHER_REPORT: &str =
    "Sol 4205 (2024-06-07), Sunny, high -21C/-5F, low -79C/-110F, pressure at 7.41 hPa";

pub const WEATHER_FEED_HTML: &str = r#"<html><body>
<div class="stream">
  <p class="TweetTextSize TweetTextSize--normal js-tweet-text tweet-text" lang="en">Happy Friday from the InSight team!</p>
  <p class="TweetTextSize TweetTextSize--normal js-tweet-text tweet-text" lang="en">
    Sol 4205 (2024-06-07), Sunny, high -21C/-5F, low -79C/-110F, pressure at 7.41 hPa
  </p>
  <p class="TweetTextSize TweetTextSize--normal js-tweet-text tweet-text" lang="en">Sol 4204 (2024-06-06), Sunny, high -23C/-9F, low -80C/-112F</p>
</div>
</body></html>"#;

pub const FACTS_HTML: &str = r#"<html><body>
<h2>Mars Planet Profile</h2>
<table id="tablepress-p-mars" class="tablepress tablepress-id-p-mars">
  <tbody class="row-hover">
    <tr class="row-1 odd"><td class="column-1"><strong>Equatorial Diameter:</strong></td><td class="column-2">6,792 km<br></td></tr>
    <tr class="row-2 even"><td class="column-1"><strong>Polar Diameter:</strong></td><td class="column-2">6,752 km<br></td></tr>
    <tr class="row-3 odd"><td class="column-1"><strong>Moons:</strong></td><td class="column-2">2 (Phobos &amp; Deimos)</td></tr>
  </tbody>
</table>
<table><tr><td>Second table</td><td>ignored</td></tr></table>
</body></html>"#;

pub const FACTS_NO_TABLE_HTML: &str =
    "<html><body><h2>Mars Planet Profile</h2><p>Temporarily unavailable.</p></body></html>";

pub const HEMISPHERE_BASE: &str = "https://astrogeology.usgs.gov";

/// The four hemispheres as `(slug, listing title)` in listing order.
pub const HEMISPHERES: [(&str, &str); 4] = [
    ("cerberus_enhanced", "Cerberus Hemisphere Enhanced"),
    ("schiaparelli_enhanced", "Schiaparelli Hemisphere Enhanced"),
    ("syrtis_major_enhanced", "Syrtis Major Hemisphere Enhanced"),
    ("valles_marineris_enhanced", "Valles Marineris Hemisphere Enhanced"),
];

pub fn hemisphere_detail_url(slug: &str) -> String {
    format!("{HEMISPHERE_BASE}/search/map/Mars/Viking/{slug}")
}

pub fn hemisphere_image_url(slug: &str) -> String {
    format!("https://astropedia.astrogeology.usgs.gov/download/Mars/Viking/{slug}.tif/full.jpg")
}

pub fn hemisphere_listing_html(items: &[(&str, &str)]) -> String {
    let mut html = String::from(
        r#"<html><body><div class="collapsible results"><div class="result-list" id="product-section">"#,
    );
    for (slug, title) in items {
        html.push_str(&format!(
            r#"
  <div class="item">
    <a href="/search/map/Mars/Viking/{slug}" class="itemLink product-item"><img class="thumb" src="/cache/images/{slug}_thumb.png" alt="{title} thumbnail"></a>
    <div class="description">
      <a href="/search/map/Mars/Viking/{slug}" class="itemLink product-item"><h3>{title}</h3></a>
      <span class="subtitle" style="float:left">image/tiff 21 MB</span>
    </div>
  </div>"#
        ));
    }
    html.push_str("</div></div></body></html>");
    html
}

pub fn hemisphere_detail_html(slug: &str, title: &str, downloads: bool, back: bool) -> String {
    let downloads = if downloads {
        format!(
            r#"<div class="downloads"><h3>Download</h3><ul>
  <li><a target="_blank" href="{}">Sample</a> (jpg) 1024px wide</li>
  <li><a target="_blank" href="https://astropedia.astrogeology.usgs.gov/download/Mars/Viking/{slug}.tif">Original</a> (tif)</li>
</ul></div>"#,
            hemisphere_image_url(slug)
        )
    } else {
        String::new()
    };
    let back = if back {
        r#"<a href="/search/results?q=hemisphere+enhanced&amp;k1=target&amp;v1=Mars" class="button">Back</a>"#
    } else {
        ""
    };
    format!(
        r#"<html><body><div class="container">
{downloads}
<div class="content"><h2 class="title">{title}</h2></div>
{back}
</div></body></html>"#
    )
}

/// A site where every hemisphere in `items` has a complete detail page.
pub fn hemisphere_site(listing_url: &str, items: &[(&str, &str)]) -> Site {
    items.iter().fold(
        Site::new().with_page(listing_url, hemisphere_listing_html(items)),
        |site, (slug, title)| {
            site.with_page(
                &hemisphere_detail_url(slug),
                hemisphere_detail_html(slug, title, true, true),
            )
        },
    )
}

/// Browser-rendered pages for all four browser-backed sources.
pub fn full_site(config: &Config) -> Site {
    let sources = &config.sources;
    HEMISPHERES.iter().fold(
        Site::new()
            .with_page(&sources.news.listing_url, NEWS_LISTING_HTML)
            .with_page(&sources.featured_image.search_url, IMAGE_SEARCH_HTML)
            .with_page(&sources.weather.feed_url, WEATHER_FEED_HTML)
            .with_page(
                &sources.hemispheres.listing_url,
                hemisphere_listing_html(&HEMISPHERES),
            ),
        |site, (slug, title)| {
            site.with_page(
                &hemisphere_detail_url(slug),
                hemisphere_detail_html(slug, title, true, true),
            )
        },
    )
}

/// Plain-HTTP pages: the news article and the facts page.
pub fn full_fetcher(config: &Config) -> FakeFetcher {
    FakeFetcher::new(
        Site::new()
            .with_page(ARTICLE_URL, NEWS_ARTICLE_HTML)
            .with_page(&config.sources.facts.url, FACTS_HTML),
    )
}
