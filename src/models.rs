//! Data models for the scraped Mars snapshot.
//!
//! - [`AggregateRecord`]: the single flat result of one pipeline run
//! - [`NewsFragment`]: headline, rollover summary and first article paragraph
//! - [`Hemisphere`]: one titled full-resolution hemisphere image
//!
//! Every field defaults to an empty value so a record read back from the
//! store, or assembled after some sources failed, is always complete.

use serde::{Deserialize, Serialize};

/// Upper bound on hemisphere entries in a record.
pub const MAX_HEMISPHERES: usize = 4;

/// The aggregate of all five sources produced by one run.
///
/// This is the only document the store ever holds; each successful run
/// replaces the previous one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregateRecord {
    /// Latest news headline, summary and article paragraph.
    pub news: NewsFragment,
    /// Absolute URL of the full-size featured image.
    pub featured_image_url: String,
    /// Text of the most recent weather report post.
    pub weather_report: String,
    /// Headerless two-column HTML table of planet facts.
    pub facts_table: String,
    /// Hemisphere images in listing order, at most [`MAX_HEMISPHERES`].
    pub hemispheres: Vec<Hemisphere>,
}

/// News fragment scraped from the listing page and the first article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsFragment {
    pub title: String,
    pub summary: String,
    pub body_paragraph: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Hemisphere {
    /// Display title with the " Enhanced" suffix removed.
    pub title: String,
    /// Full-resolution image URL from the detail page's downloads section.
    pub image_url: String,
}
