//! Mars facts table scraper.
//!
//! The facts page is static, so it is fetched over plain HTTP. The first
//! table on the page is read as key/value rows and re-serialised as a
//! headerless, indexless HTML table for display.

use crate::config::FactsSource;
use crate::error::{Result, ScrapeError};
use crate::fetch::Fetcher;
use crate::utils::{element_text, escape_html};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td, th").unwrap());

/// One row of the facts table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub key: String,
    pub value: String,
}

/// Parse the first table on the page into key/value rows.
///
/// Only the first two cells of each row are kept; a single-cell row gets an
/// empty value and empty rows are skipped.
///
/// # Errors
///
/// [`ScrapeError::Structure`] when the page has no table or the table has no
/// usable rows.
pub fn parse_facts(html: &str) -> Result<Vec<Fact>> {
    let document = Html::parse_document(html);
    let table = document
        .select(&TABLE)
        .next()
        .ok_or_else(|| ScrapeError::Structure("no table on facts page".to_string()))?;

    let facts: Vec<Fact> = table
        .select(&ROW)
        .filter_map(|row| {
            let mut cells = row.select(&CELL).map(element_text);
            let key = cells.next()?;
            let value = cells.next().unwrap_or_default();
            Some(Fact { key, value })
        })
        .collect();

    if facts.is_empty() {
        return Err(ScrapeError::Structure(
            "facts table has no rows".to_string(),
        ));
    }
    Ok(facts)
}

/// Serialise rows as a two-column HTML table with no header row.
pub fn render_table(facts: &[Fact]) -> String {
    let rows = facts
        .iter()
        .map(|f| {
            format!(
                "    <tr>\n      <td>{}</td>\n      <td>{}</td>\n    </tr>\n",
                escape_html(&f.key),
                escape_html(&f.value)
            )
        })
        .join("");
    format!("<table border=\"1\" class=\"dataframe\">\n  <tbody>\n{rows}  </tbody>\n</table>")
}

/// Fetch the facts page and return its table as an HTML fragment.
///
/// A page without a table is an error for this source; the aggregator turns
/// it into an empty field.
#[instrument(level = "info", skip_all, fields(url = %source.url))]
pub async fn extract<F: Fetcher>(fetcher: &F, source: &FactsSource) -> Result<String> {
    let html = fetcher.fetch_text(&source.url).await?;
    let facts = parse_facts(&html)?;
    debug!(?facts, "Parsed facts");
    info!(rows = facts.len(), "Scraped Mars facts table");
    Ok(render_table(&facts))
}
