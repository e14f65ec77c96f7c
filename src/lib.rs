//! # bibleurl
//!
//! Daily Bible reading plans with BibleGateway links, plus a hardened
//! converter that turns a fetched passage page into Markdown.
//!
//! ## Reading Plan
//!
//! Each day covers three independent tracks that wrap around when finished:
//!
//! - Old Testament (3 chapters a day by default)
//! - Gospels (1 chapter)
//! - Acts through Revelation (1 chapter)
//!
//! ## Quick Start
//!
//! ```
//! use bibleurl::ReadingPlan;
//!
//! fn main() -> bibleurl::Result<()> {
//!     let reading = ReadingPlan::default().reading(1)?;
//!     assert_eq!(reading.search, "Genesis 1-3, Matthew 1, Acts 1");
//!     println!("{}", reading.url);
//!     Ok(())
//! }
//! ```
//!
//! ## Passage Conversion
//!
//! ```
//! let html = r#"<div class="passage-text"><p><sup class="versenum">1</sup>In the beginning</p></div>"#;
//! let markdown = bibleurl::to_markdown(html)?;
//! assert_eq!(markdown, "<sup>1</sup> In the beginning");
//! # Ok::<(), bibleurl::Error>(())
//! ```
//!
//! Conversion runs in time linear in the page size and stops with
//! [`Error::Timeout`] if it exceeds its wall-clock budget.
//!
//! ## Features
//!
//! - `fetch` (default): download passage pages with `reqwest`

pub mod args;
pub mod bible;
pub mod chapters;
pub mod config;
pub mod entities;
pub mod error;
pub mod html;
pub mod options;
pub mod paths;
pub mod plan;
pub mod sanitize;
pub mod url;

#[cfg(feature = "fetch")]
pub mod fetch;

// Re-exports
pub use config::{merge_config, ConfigOverrides, PlanConfig};
pub use error::{Error, Result};
pub use html::{parse_html_to_markdown, parse_html_to_markdown_with_options, PARSE_FALLBACK_MESSAGE};
pub use options::ConvertOptions;
pub use plan::{generate_daily_reading, DailyReading};

#[cfg(feature = "fetch")]
pub use fetch::PassageFetcher;

/// Converts a passage page to Markdown with default options.
pub fn to_markdown(html: &str) -> Result<String> {
    parse_html_to_markdown(html)
}

/// Converts a passage page to Markdown with custom options.
///
/// # Example
///
/// ```
/// use bibleurl::{to_markdown_with_options, ConvertOptions};
/// use std::time::Duration;
///
/// let options = ConvertOptions::new()
///     .with_timeout(Duration::from_secs(1))
///     .without_footnotes();
/// let markdown = to_markdown_with_options("<p>no passage here</p>", &options)?;
/// assert_eq!(markdown, bibleurl::PARSE_FALLBACK_MESSAGE);
/// # Ok::<(), bibleurl::Error>(())
/// ```
pub fn to_markdown_with_options(html: &str, options: &ConvertOptions) -> Result<String> {
    parse_html_to_markdown_with_options(html, options)
}

/// Downloads a passage page and converts it to Markdown.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> bibleurl::Result<()> {
/// let reading = bibleurl::ReadingPlan::default().reading(1)?;
/// let markdown = bibleurl::fetch_markdown(&reading.url).await?;
/// std::fs::write("day-1.md", markdown)?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "fetch")]
pub async fn fetch_markdown(url: &str) -> Result<String> {
    PassageFetcher::new()?.fetch_markdown(url).await
}

/// A validated plan configuration ready to produce readings.
///
/// # Example
///
/// ```
/// use bibleurl::{ConfigOverrides, ReadingPlan};
///
/// let plan = ReadingPlan::default().with_overrides(ConfigOverrides {
///     ot_chapters_per_day: Some(1),
///     ..Default::default()
/// })?;
/// let reading = plan.reading_in(2, "ESV")?;
/// assert_eq!(reading.search, "Genesis 2, Matthew 2, Acts 2");
/// # Ok::<(), bibleurl::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadingPlan {
    config: PlanConfig,
}

impl ReadingPlan {
    /// Wraps a configuration after validating it.
    pub fn new(config: PlanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Applies overrides on top of the current configuration.
    pub fn with_overrides(self, overrides: ConfigOverrides) -> Result<Self> {
        Ok(Self {
            config: self.config.merge(overrides)?,
        })
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// The reading for `day` in the configured default version.
    pub fn reading(&self, day: u64) -> Result<DailyReading> {
        generate_daily_reading(day, &self.config.default_version, &self.config)
    }

    /// The reading for `day` in a specific version.
    pub fn reading_in(&self, day: u64, version: &str) -> Result<DailyReading> {
        generate_daily_reading(day, version, &self.config)
    }
}
