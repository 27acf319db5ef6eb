//! Runtime configuration.
//!
//! A [`Config`] is built once in `main` (YAML file plus command-line overrides)
//! and handed to the aggregator, the store and the HTTP surface. Nothing here
//! is global; tests construct their own values.
//!
//! # Example `config.yaml`
//!
//! ```yaml
//! webdriver_url: http://localhost:9515
//! headless: true
//! wait_timeout_secs: 15
//! store_path: /var/lib/mars_scrape/mars.json
//! sources:
//!   weather:
//!     feed_url: https://twitter.com/marswxreport?lang=en
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Address of the running chromedriver (or other WebDriver server).
    pub webdriver_url: String,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Upper bound for every "wait until element is present" condition.
    pub wait_timeout_secs: u64,
    /// Timeout for plain HTTP fetches.
    pub http_timeout_secs: u64,
    /// JSON file holding the single current record.
    pub store_path: String,
    pub sources: Sources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: false,
            wait_timeout_secs: 10,
            http_timeout_secs: 30,
            store_path: "./data/mars.json".to_string(),
            sources: Sources::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, or defaults when no path is given.
    ///
    /// Keys missing from the file keep their default values.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Per-source locations.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Sources {
    pub news: NewsSource,
    pub featured_image: FeaturedImageSource,
    pub weather: WeatherSource,
    pub facts: FactsSource,
    pub hemispheres: HemisphereSource,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsSource {
    pub listing_url: String,
    /// Base that relative article links are resolved against.
    pub base_url: String,
}

impl Default for NewsSource {
    fn default() -> Self {
        Self {
            listing_url: "https://mars.nasa.gov/news/".to_string(),
            base_url: "https://mars.nasa.gov/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeaturedImageSource {
    pub search_url: String,
    /// Directory holding the full-size JPEGs, keyed by image identifier.
    pub full_size_base: String,
}

impl Default for FeaturedImageSource {
    fn default() -> Self {
        Self {
            search_url: "https://www.jpl.nasa.gov/spaceimages/?search=&category=Mars".to_string(),
            full_size_base: "https://photojournal.jpl.nasa.gov/jpeg/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherSource {
    pub feed_url: String,
}

impl Default for WeatherSource {
    fn default() -> Self {
        Self {
            feed_url: "https://twitter.com/marswxreport?lang=en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FactsSource {
    pub url: String,
}

impl Default for FactsSource {
    fn default() -> Self {
        Self {
            url: "https://space-facts.com/mars/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HemisphereSource {
    pub listing_url: String,
}

impl Default for HemisphereSource {
    fn default() -> Self {
        Self {
            listing_url:
                "https://astrogeology.usgs.gov/search/results?q=hemisphere+enhanced&k1=target&v1=Mars"
                    .to_string(),
        }
    }
}
