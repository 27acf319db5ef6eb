//! Command-line interface definitions.
//!
//! Global options locate the configuration and override the few settings
//! that are commonly changed per invocation; the subcommand picks between a
//! one-shot scrape, the HTTP trigger/display server and offline rendering.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Mars scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape once and print the record
/// mars_scrape scrape --print
///
/// # Serve the page on port 5000 against a headless chromedriver
/// mars_scrape --headless serve --bind 0.0.0.0:5000
///
/// # Render the stored record to a file
/// mars_scrape render --out mars.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, env = "MARS_SCRAPE_CONFIG", global = true)]
    pub config: Option<String>,

    /// WebDriver endpoint, e.g. a local chromedriver
    #[arg(long, env = "WEBDRIVER_URL", global = true)]
    pub webdriver_url: Option<String>,

    /// Run the browser without a visible window
    #[arg(long, global = true)]
    pub headless: bool,

    /// Path of the JSON file holding the current record
    #[arg(short, long, global = true)]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scrape every source once and replace the stored record
    Scrape {
        /// Print the new record as JSON
        #[arg(long)]
        print: bool,
    },
    /// Serve the display page and the scrape trigger over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: String,
    },
    /// Render the stored record as an HTML page
    Render {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<String>,
    },
}
