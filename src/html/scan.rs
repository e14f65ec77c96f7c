//! Bounded matching helpers.
//!
//! Element content is never matched with a wildcard. An opening tag is found
//! with a tag-local pattern, then the content runs to the first match of a
//! closing pattern after it, located by a forward search. [`Finder`]
//! remembers its last answer, so a run of opening tags that share one closing
//! tag (or have none at all) costs a single scan instead of one scan per tag.

use regex::{Captures, Regex};
use std::ops::Range;

/// Largest char boundary not above `index`.
pub(crate) fn floor_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Memoizing forward search over one haystack.
///
/// `find_from(p)` returns the first match starting at or after `p`. When the
/// queries are non-decreasing, which is how every rule walks a document,
/// previous answers are reused: a remembered hit at or after `p` is still the
/// first one, and a remembered miss from an earlier position covers `p` too.
pub(crate) struct Finder<'h, 'p> {
    haystack: &'h str,
    pattern: &'p Regex,
    last_from: usize,
    hit: Option<Range<usize>>,
    miss_from: Option<usize>,
}

impl<'h, 'p> Finder<'h, 'p> {
    pub(crate) fn new(haystack: &'h str, pattern: &'p Regex) -> Self {
        Self {
            haystack,
            pattern,
            last_from: 0,
            hit: None,
            miss_from: None,
        }
    }

    /// First match starting at or after `from`.
    pub(crate) fn find_from(&mut self, from: usize) -> Option<Range<usize>> {
        if from >= self.last_from {
            if matches!(self.miss_from, Some(miss) if from >= miss) {
                return None;
            }
            if let Some(hit) = &self.hit {
                if hit.start >= from {
                    return Some(hit.clone());
                }
            }
        } else {
            self.hit = None;
            self.miss_from = None;
        }
        self.last_from = from;

        let found = if from > self.haystack.len() {
            None
        } else {
            self.pattern.find_at(self.haystack, from).map(|m| m.range())
        };
        match &found {
            Some(range) => self.hit = Some(range.clone()),
            None => self.miss_from = Some(from),
        }
        found
    }
}

/// One opening tag paired with the content up to its closing sequence.
pub(crate) struct Element<'h> {
    /// Captures of the opening-tag pattern.
    pub caps: Captures<'h>,
    /// Byte range of the content, absolute in the haystack.
    pub inner: Range<usize>,
    /// Byte range of the whole element including the closing sequence.
    pub outer: Range<usize>,
}

/// Rewrites every `open … close` element for which `render` returns text.
///
/// Elements that `render` declines are left untouched and scanning resumes
/// right after their opening tag, mirroring a failed match attempt.
pub(crate) fn replace_elements<F>(text: &str, open: &Regex, close: &Regex, mut render: F) -> String
where
    F: FnMut(&str, &Element<'_>) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut search = 0;
    let mut closes = Finder::new(text, close);

    while search <= text.len() {
        let Some(caps) = open.captures_at(text, search) else {
            break;
        };
        let tag = caps.get_match().range();
        let Some(close_at) = closes.find_from(tag.end) else {
            // No closing sequence from here on; no later element can close either.
            break;
        };
        let element = Element {
            inner: tag.end..close_at.start,
            outer: tag.start..close_at.end,
            caps,
        };
        match render(text, &element) {
            Some(replacement) => {
                out.push_str(&text[copied..element.outer.start]);
                out.push_str(&replacement);
                copied = element.outer.end;
                search = element.outer.end;
            }
            None => search = tag.end.max(tag.start + 1),
        }
    }

    out.push_str(&text[copied..]);
    out
}

/// Collects non-overlapping `open … close` elements in document order.
pub(crate) fn collect_elements<'h>(text: &'h str, open: &Regex, close: &Regex) -> Vec<Element<'h>> {
    let mut elements = Vec::new();
    let mut search = 0;
    let mut closes = Finder::new(text, close);

    while search <= text.len() {
        let Some(caps) = open.captures_at(text, search) else {
            break;
        };
        let tag = caps.get_match().range();
        let Some(close_at) = closes.find_from(tag.end) else {
            break;
        };
        search = close_at.end;
        elements.push(Element {
            inner: tag.end..close_at.start,
            outer: tag.start..close_at.end,
            caps,
        });
    }

    elements
}
