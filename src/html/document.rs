//! Whole-page conversion.
//!
//! A passage page holds one column per requested passage, each with its own
//! heading and `passage-text` body, followed by shared cross-reference and
//! footnote sections. Pages without columns fall back to scanning for bare
//! `passage-text` blocks.

use super::display::{find_display_label, DisplayBlock};
use super::footnotes::extract_footnotes;
use super::passage::process_passage_html;
use super::scan::{floor_boundary, Finder};
use crate::entities::decode_entities;
use crate::error::{Error, Result};
use crate::options::ConvertOptions;
use crate::sanitize::replace_control_chars;
use regex::Regex;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

/// Returned when a non-empty page yields no passage text.
pub const PARSE_FALLBACK_MESSAGE: &str =
    "\u{26A0} Could not extract passage text. The page structure may have changed.";

/// Default wall-clock budget for one conversion.
pub const PARSE_TIMEOUT: Duration = Duration::from_secs(5);

/// How far back from a column marker to look for its `<div`.
const COLUMN_LOOKBEHIND: usize = 200;

static RE_PASSAGE_COL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)class="[^"]*passage-col[^"]*""#).unwrap());
static RE_DIV_OPEN_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<div[^>]*$").unwrap());
static RE_PASSAGE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div class="passage-text">"#).unwrap());

/// Sections that follow the last column.
static RE_COLUMN_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div class="(?:crossrefs|footnotes)"#).unwrap());
static RE_PUBLISHER_INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div class="publisher-info"#).unwrap());
static RE_DOUBLE_DIV_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</div>\s*</div>").unwrap());

/// Wall-clock budget for one conversion, checked between units of work.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use bibleurl::html::ConversionContext;
///
/// let ctx = ConversionContext::new(Some(Duration::from_secs(5)));
/// assert!(ctx.check_timeout().is_ok());
///
/// let ctx = ConversionContext::new(Some(Duration::ZERO));
/// assert!(ctx.check_timeout().is_err());
/// ```
#[derive(Debug)]
pub struct ConversionContext {
    start_time: Instant,
    /// `None` disables the check.
    timeout: Option<Duration>,
}

impl ConversionContext {
    /// Starts the clock.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            start_time: Instant::now(),
            timeout,
        }
    }

    /// Returns [`Error::Timeout`] once the budget is spent.
    pub fn check_timeout(&self) -> Result<()> {
        match self.timeout {
            Some(timeout) if self.start_time.elapsed() >= timeout => {
                log::warn!("HTML conversion exceeded {timeout:?}");
                Err(Error::Timeout)
            }
            _ => Ok(()),
        }
    }

    /// Time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Converts a passage page to Markdown with default options.
///
/// Empty or whitespace-only input gives an empty string. Any other input
/// that yields nothing gives [`PARSE_FALLBACK_MESSAGE`].
///
/// # Errors
///
/// [`Error::Timeout`] when conversion runs past [`PARSE_TIMEOUT`].
///
/// # Example
///
/// ```
/// use bibleurl::html::{parse_html_to_markdown, PARSE_FALLBACK_MESSAGE};
///
/// assert_eq!(parse_html_to_markdown("   ").unwrap(), "");
/// assert_eq!(parse_html_to_markdown("<p>hi</p>").unwrap(), PARSE_FALLBACK_MESSAGE);
/// ```
pub fn parse_html_to_markdown(html: &str) -> Result<String> {
    parse_html_to_markdown_with_options(html, &ConvertOptions::default())
}

/// Converts a passage page to Markdown.
pub fn parse_html_to_markdown_with_options(html: &str, options: &ConvertOptions) -> Result<String> {
    if html.trim().is_empty() {
        return Ok(String::new());
    }
    let ctx = ConversionContext::new(options.timeout);

    let version = find_display_label(html, DisplayBlock::Version).map(clean_label);
    let columns = split_passage_columns(html);
    log::debug!("found {} passage column(s)", columns.len());

    let mut blocks: Vec<String> = Vec::new();
    if columns.is_empty() {
        convert_without_columns(html, version, &ctx, &mut blocks)?;
    } else {
        let mut version = version;
        for column in columns {
            ctx.check_timeout()?;
            if let Some(heading) = find_display_label(column, DisplayBlock::Passage) {
                blocks.push(format!("# {}", clean_label(heading)));
                if let Some(version) = version.take() {
                    blocks.push(format!("*{version}*"));
                }
            }
            if let Some(body) = column_body(column) {
                push_passage(&mut blocks, body);
            }
        }
    }

    if options.include_footnotes {
        if let Some(footnotes) = extract_footnotes(html) {
            blocks.push(footnotes);
        }
    }

    let markdown = blocks.join("\n\n").trim().to_string();
    log::debug!("converted {} bytes of HTML in {:?}", html.len(), ctx.elapsed());
    if markdown.is_empty() {
        log::debug!("no passage content found");
        return Ok(PARSE_FALLBACK_MESSAGE.to_string());
    }
    Ok(markdown)
}

/// Pages without passage columns: whole-page heading, then every
/// `passage-text` block in order.
fn convert_without_columns(
    html: &str,
    version: Option<String>,
    ctx: &ConversionContext,
    blocks: &mut Vec<String>,
) -> Result<()> {
    if let Some(heading) = find_display_label(html, DisplayBlock::Passage) {
        blocks.push(format!("# {}", clean_label(heading)));
    }
    if let Some(version) = version {
        blocks.push(format!("*{version}*"));
    }

    let mut publisher = Finder::new(html, &RE_PUBLISHER_INFO);
    let mut search = 0;
    while let Some(open) = RE_PASSAGE_TEXT.find_at(html, search) {
        ctx.check_timeout()?;
        let next = RE_PASSAGE_TEXT.find_at(html, open.end()).map(|m| m.start());
        let end = [next, publisher.find_from(open.end()).map(|r| r.start)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(html.len());
        push_passage(blocks, &html[open.end()..end]);
        search = end.max(open.end());
    }
    Ok(())
}

fn push_passage(blocks: &mut Vec<String>, body: &str) {
    let markdown = process_passage_html(body);
    if !markdown.is_empty() {
        blocks.push(markdown);
    }
}

/// Splits a page into passage columns.
///
/// Each column runs from its `<div` to the next column, and the last one to
/// the cross-reference or footnote section.
pub(crate) fn split_passage_columns(html: &str) -> Vec<&str> {
    let starts: Vec<usize> = RE_PASSAGE_COL
        .find_iter(html)
        .map(|marker| {
            let window = floor_boundary(html, marker.start().saturating_sub(COLUMN_LOOKBEHIND));
            match RE_DIV_OPEN_TAIL.find(&html[window..marker.start()]) {
                Some(div) => window + div.start(),
                None => marker.start(),
            }
        })
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = match starts.get(i + 1) {
                Some(&next) => next.max(start),
                None => RE_COLUMN_BOUNDARY
                    .find_at(html, start)
                    .map_or(html.len(), |m| m.start()),
            };
            &html[start..end]
        })
        .collect()
}

/// The `passage-text` content of one column.
fn column_body(column: &str) -> Option<&str> {
    let open = RE_PASSAGE_TEXT.find(column)?;
    let end = RE_DOUBLE_DIV_CLOSE
        .find_at(column, open.end())
        .map_or(column.len(), |m| m.start());
    let body = &column[open.end()..end];
    (!body.is_empty()).then_some(body)
}

fn clean_label(label: &str) -> String {
    let label = decode_entities(label.trim());
    replace_control_chars(&label).into_owned()
}
