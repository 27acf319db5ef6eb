//! Error taxonomy for the scraping pipeline.
//!
//! Only [`ScrapeError::Session`] is fatal to a run. Every other variant is a
//! content or navigation problem that the [`crate::aggregator`] maps to the
//! affected field's empty default.

use thiserror::Error;

/// Result alias used by the extractors and the browser/HTTP seams.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The browser session could not be opened at all.
    #[error("could not open browser session: {0}")]
    Session(String),

    /// A command against an open browser session failed.
    #[error("browser command failed: {0}")]
    Browser(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Expected markup is absent or parsed to nothing.
    #[error("expected markup missing: {0}")]
    Structure(String),

    /// No link on the current page carries the requested text.
    #[error("no link containing '{0}' on the current page")]
    Navigation(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl ScrapeError {
    /// Environment failures abort the whole run; everything else degrades.
    pub fn is_environment(&self) -> bool {
        matches!(self, ScrapeError::Session(_))
    }
}
