//! Passage and version display blocks.
//!
//! Both blocks share one shape:
//!
//! ```html
//! <div class="bcv"><div class="dropdown-display-text">Genesis 1</div>…</div></div>
//! ```
//!
//! The label sits in the first `</div>`-terminated element after the outer
//! opening tag, so it is found by walking back from that closing tag rather
//! than forward through arbitrary content.

use super::scan::Finder;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static RE_DIV_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</div>").unwrap());
static RE_LEADING_DIV_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*</div>").unwrap());

static RE_BCV_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div\b[^>]*class=['"]bcv['"][^>]*>"#).unwrap());

static RE_TRANSLATION_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div\b[^>]*class=['"]translation['"][^>]*>"#).unwrap());

static RE_DROPDOWN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^<div\b[^>]*class="dropdown-display-text"[^>]*>$"#).unwrap()
});

/// Which display block to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayBlock {
    /// Book-chapter-verse heading (`class="bcv"`).
    Passage,
    /// Translation name (`class="translation"`).
    Version,
}

impl DisplayBlock {
    fn opener(self) -> &'static Regex {
        match self {
            DisplayBlock::Passage => &RE_BCV_OPEN,
            DisplayBlock::Version => &RE_TRANSLATION_OPEN,
        }
    }
}

#[derive(Debug, Clone)]
struct DisplayMatch {
    tag_start: usize,
    label: Range<usize>,
    /// End of `</div></div>` closing the outer block, when present.
    block_end: Option<usize>,
}

/// Label lookups memoized per closing tag.
struct DisplayScanner<'h> {
    text: &'h str,
    label_closes: Finder<'h, 'static>,
    block_closes: Finder<'h, 'static>,
    memo: Option<(usize, Option<DisplayMatch>)>,
}

impl<'h> DisplayScanner<'h> {
    fn new(text: &'h str) -> Self {
        Self {
            text,
            label_closes: Finder::new(text, &RE_DIV_CLOSE),
            block_closes: Finder::new(text, &RE_DIV_CLOSE),
            memo: None,
        }
    }

    /// The dropdown label belonging to an outer tag ending at `after`.
    fn match_after(&mut self, after: usize) -> Option<DisplayMatch> {
        let close = self.label_closes.find_from(after)?;
        let found = match &self.memo {
            Some((at, found)) if *at == close.start => found.clone(),
            _ => {
                let found = self.label_before(close.clone());
                self.memo = Some((close.start, found.clone()));
                found
            }
        }?;
        (found.tag_start >= after).then_some(found)
    }

    fn label_before(&mut self, close: Range<usize>) -> Option<DisplayMatch> {
        let text = self.text;
        let tag_start = text[..close.start].rfind('<')?;
        let tag_len = text[tag_start..close.start].find('>')? + 1;
        if !RE_DROPDOWN_TAG.is_match(&text[tag_start..tag_start + tag_len]) {
            return None;
        }
        let label = tag_start + tag_len..close.start;
        if label.is_empty() {
            return None;
        }

        let block_end = self.block_closes.find_from(close.end).and_then(|second| {
            RE_LEADING_DIV_CLOSE
                .find(&text[second.end..])
                .map(|third| second.end + third.end())
        });

        Some(DisplayMatch {
            tag_start,
            label,
            block_end,
        })
    }
}

/// First display label of the given kind anywhere in `html`.
pub fn find_display_label(html: &str, block: DisplayBlock) -> Option<&str> {
    let opener = block.opener();
    let mut scanner = DisplayScanner::new(html);
    let mut search = 0;

    while let Some(open) = opener.find_at(html, search) {
        if let Some(found) = scanner.match_after(open.end()) {
            return Some(&html[found.label]);
        }
        search = open.end();
    }
    None
}

/// Replaces every complete display block with `render(label)`.
///
/// A block is complete when the label element is followed by the outer
/// block's own `</div>` and one more `</div>`.
pub(crate) fn replace_display_blocks<F>(text: &str, block: DisplayBlock, render: F) -> String
where
    F: Fn(&str) -> String,
{
    let opener = block.opener();
    let mut scanner = DisplayScanner::new(text);
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(open) = opener.find_at(text, search) {
        let complete = scanner
            .match_after(open.end())
            .and_then(|found| found.block_end.map(|end| (found.label, end)));
        match complete {
            Some((label, end)) => {
                out.push_str(&text[copied..open.start()]);
                out.push_str(&render(text[label].trim()));
                copied = end;
                search = end;
            }
            None => search = open.end(),
        }
    }

    out.push_str(&text[copied..]);
    out
}
