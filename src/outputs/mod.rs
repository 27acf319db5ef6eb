//! Persistence and presentation of the aggregate record.
//!
//! # Submodules
//!
//! - [`json`]: single-document JSON store; each run replaces the stored record
//! - [`html`]: renders a record as a standalone HTML page
//!
//! # Output Structure
//!
//! ```text
//! data/
//! └── mars.json      # the one current record (path from config `store_path`)
//! ```

pub mod html;
pub mod json;
