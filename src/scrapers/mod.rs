//! Source extractors, one per Mars data source.
//!
//! Each extractor fetches one source and parses it into a typed fragment.
//! Parsing lives in synchronous `parse_*` functions over the page HTML so it
//! can be tested offline against captured markup; the async `extract`
//! functions only drive navigation and call into them.
//!
//! # Sources
//!
//! | Source | Module | Access | Output |
//! |--------|--------|--------|--------|
//! | NASA Mars News | [`news`] | browser + HTTP | title, summary, first paragraph |
//! | JPL Space Images | [`featured_image`] | browser | full-size image URL |
//! | Mars Weather feed | [`weather`] | browser | latest "Sol" report |
//! | Space Facts | [`facts`] | HTTP | two-column HTML table |
//! | USGS Astrogeology | [`hemispheres`] | browser, click-through | 4 titled image URLs |
//!
//! # Failure policy
//!
//! Missing markup inside a page degrades the affected value to empty and is
//! logged. Errors returned from `extract` are mapped to empty defaults by the
//! [`crate::aggregator`], except session-open failures which abort the run.

pub mod facts;
pub mod featured_image;
pub mod hemispheres;
pub mod news;
pub mod weather;
