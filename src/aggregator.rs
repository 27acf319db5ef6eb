//! The scrape pipeline: five extractors run in a fixed order into one record.
//!
//! Sources are scraped strictly one after another, each browser-backed
//! source in its own session. A source that fails contributes its empty
//! default; only a session that cannot be opened at all fails the run.

use crate::config::{Config, Sources};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::AggregateRecord;
use crate::scrapers::{facts, featured_image, hemispheres, news, weather};
use crate::session::{SessionManager, with_session};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Produces the current Mars snapshot.
#[derive(Debug)]
pub struct Aggregator<M, F> {
    sessions: M,
    fetcher: F,
    sources: Sources,
}

impl<M, F> Aggregator<M, F>
where
    M: SessionManager,
    F: Fetcher,
{
    pub fn new(sessions: M, fetcher: F, config: &Config) -> Self {
        Self {
            sessions,
            fetcher,
            sources: config.sources.clone(),
        }
    }

    /// Scrape news → featured image → weather → facts → hemispheres.
    ///
    /// # Errors
    ///
    /// Only [`crate::error::ScrapeError::Session`]: a browser session could
    /// not be opened.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<AggregateRecord> {
        let t0 = Instant::now();
        let sources = &self.sources;

        let news = degrade(
            "news",
            with_session(&self.sessions, "news", async |browser| {
                news::extract(browser, &self.fetcher, &sources.news).await
            })
            .await,
        )?;

        let featured_image_url = degrade(
            "featured_image",
            with_session(&self.sessions, "featured_image", async |browser| {
                featured_image::extract(browser, &sources.featured_image).await
            })
            .await,
        )?;

        let weather_report = degrade(
            "weather",
            with_session(&self.sessions, "weather", async |browser| {
                weather::extract(browser, &sources.weather).await
            })
            .await,
        )?;

        let facts_table = degrade(
            "facts",
            facts::extract(&self.fetcher, &sources.facts).await,
        )?;

        let hemispheres = degrade(
            "hemispheres",
            with_session(&self.sessions, "hemispheres", async |browser| {
                hemispheres::extract(browser, &sources.hemispheres).await
            })
            .await,
        )?;

        let record = AggregateRecord {
            news,
            featured_image_url,
            weather_report,
            facts_table,
            hemispheres,
        };

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            news = !record.news.title.is_empty(),
            featured_image = !record.featured_image_url.is_empty(),
            weather = !record.weather_report.is_empty(),
            facts = !record.facts_table.is_empty(),
            hemispheres = record.hemispheres.len(),
            "Scrape run complete"
        );
        Ok(record)
    }
}

/// Map a source's failure to its empty default, keeping environment failures.
fn degrade<T: Default>(source: &str, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_environment() => Err(e),
        Err(e) => {
            warn!(source, error = %e, "Source failed; using empty value");
            Ok(T::default())
        }
    }
}
