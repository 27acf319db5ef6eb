//! HTML page rendering for a stored record.
//!
//! Every section is always emitted; an empty field renders as an empty
//! section rather than an error, so a fresh install or a partly failed run
//! still produces a valid page.

use crate::models::AggregateRecord;
use crate::utils::escape_html;
use itertools::Itertools;
use std::fmt::Write;

/// Render the full display page.
pub fn render_page(record: &AggregateRecord) -> String {
    let mut page = String::new();

    let _ = writeln!(
        page,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Mission to Mars</title>
  <style>
    body {{ font-family: sans-serif; max-width: 1100px; margin: 0 auto; padding: 1rem; }}
    .hemispheres {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: 1rem; }}
    img {{ max-width: 100%; }}
    table.dataframe td {{ padding: 0.25rem 0.75rem; }}
  </style>
</head>
<body>
  <header>
    <h1>Mission to Mars</h1>
    <p><a href="/scrape">Scrape new data</a></p>
  </header>"#
    );

    let news = &record.news;
    let _ = writeln!(
        page,
        r#"  <section id="news">
    <h2>Latest Mars News</h2>
    <h3>{}</h3>
    <p class="summary">{}</p>
    <p class="body">{}</p>
  </section>"#,
        escape_html(&news.title),
        escape_html(&news.summary),
        escape_html(&news.body_paragraph)
    );

    let featured = if record.featured_image_url.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="Featured Mars image">"#,
            escape_html(&record.featured_image_url)
        )
    };
    let _ = writeln!(
        page,
        r#"  <section id="featured-image">
    <h2>Featured Mars Image</h2>
    {featured}
  </section>"#
    );

    let _ = writeln!(
        page,
        r#"  <section id="weather">
    <h2>Mars Weather</h2>
    <p>{}</p>
  </section>"#,
        escape_html(&record.weather_report)
    );

    // Produced by the facts extractor with its cells already escaped.
    let _ = writeln!(
        page,
        r#"  <section id="facts">
    <h2>Mars Facts</h2>
    {}
  </section>"#,
        record.facts_table
    );

    let figures = record
        .hemispheres
        .iter()
        .map(|h| {
            format!(
                r#"    <figure>
      <img src="{}" alt="{}">
      <figcaption>{}</figcaption>
    </figure>"#,
                escape_html(&h.image_url),
                escape_html(&h.title),
                escape_html(&h.title)
            )
        })
        .join("\n");
    let _ = writeln!(
        page,
        r#"  <section id="hemispheres">
    <h2>Mars Hemispheres</h2>
    <div class="hemispheres">
{figures}
    </div>
  </section>
</body>
</html>"#
    );

    page
}
