//! Footnote section extraction.

use super::scan::{collect_elements, replace_elements, Finder};
use crate::entities::decode_entities;
use crate::sanitize::replace_control_chars;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Header placed above the rendered entries.
pub const FOOTNOTES_HEADER: &str = "---\n\n#### Footnotes";

static RE_FOOTNOTES_DIV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div class="footnotes">"#).unwrap());

/// Sequences that end a `<div class="footnotes">` container.
static RE_FOOTNOTES_DIV_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)</div>(?:\n|  )?</div>|<div class="(?:publisher|crossrefs)"#).unwrap()
});

static RE_OL_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</ol>").unwrap());
static RE_LI_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</li>").unwrap());
static RE_A_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</a>").unwrap());

static RE_FOOTNOTES_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<ol\b[^>]*class="[^"]*footnotes[^"]*"[^>]*>"#).unwrap()
});

/// Only `fen-` items are footnotes; cross-references use `cen-`.
static RE_FOOTNOTE_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<li\b[^>]*\sid="(fen-[^"]+)"[^>]*>"#).unwrap()
});

static RE_TRAILING_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-z]+$").unwrap());

static RE_BIBLEREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\b[^>]*class="[^"]*bibleref[^"]*"[^>]*>"#).unwrap()
});

static RE_ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Finds every footnote container in a page and renders the entries.
///
/// Returns `None` when the page has no footnote entries at all, so the
/// caller can leave the section out.
pub fn extract_footnotes(html: &str) -> Option<String> {
    let mut fragments: Vec<&str> = Vec::new();

    let mut markers = Finder::new(html, &RE_FOOTNOTES_DIV);
    let mut boundaries = Finder::new(html, &RE_FOOTNOTES_DIV_END);
    let mut search = 0;
    while let Some(marker) = markers.find_from(search) {
        let content_start = marker.end;
        let end = boundaries
            .find_from(content_start)
            .map_or(html.len(), |range| range.start);
        fragments.push(&html[content_start..end]);
        search = end.max(content_start);
    }

    for list in collect_elements(html, &RE_FOOTNOTES_LIST, &RE_OL_CLOSE) {
        let content = &html[list.inner];
        if !content.is_empty() {
            fragments.push(content);
        }
    }

    if fragments.is_empty() {
        return None;
    }
    log::trace!("found {} footnote container(s)", fragments.len());
    process_footnotes_html(&fragments.join("\n"))
}

/// Renders `<li id="fen-…">` items as `**letter.** text` entries.
///
/// An id seen twice (a footnote list inside a footnote container) is
/// rendered once.
pub fn process_footnotes_html(html: &str) -> Option<String> {
    let mut seen = HashSet::new();
    let entries: Vec<String> = collect_elements(html, &RE_FOOTNOTE_ITEM, &RE_LI_CLOSE)
        .iter()
        .filter_map(|item| {
            let id = item.caps.get(1)?.as_str();
            if !seen.insert(id) {
                return None;
            }
            let text = footnote_text(&html[item.inner.clone()]);
            Some(format!("**{}.** {}", footnote_letter(id), text))
        })
        .collect();

    if entries.is_empty() {
        return None;
    }
    Some(format!("{FOOTNOTES_HEADER}\n\n{}", entries.join("\n\n")))
}

/// The trailing letters of an id such as `fen-NIV-26a`, empty when it ends
/// in anything else.
fn footnote_letter(id: &str) -> &str {
    RE_TRAILING_LETTERS.find(id).map_or("", |m| m.as_str())
}

fn footnote_text(content: &str) -> String {
    let text = replace_elements(content, &RE_BIBLEREF, &RE_A_CLOSE, |text, el| {
        let inner = &text[el.inner.clone()];
        (!inner.is_empty() && !inner.contains('<')).then(|| inner.to_string())
    });
    let text = RE_ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = replace_control_chars(&text);
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const FOOTNOTES: &str = r##"<div class="footnotes">
<h4>Footnotes</h4>
<ol>
<li id="fen-NIV-26a"><a href="#en-NIV-26" title="Go to Genesis 1:26">Genesis 1:26</a> <span class='footnote-text'>Probable reading of the original Hebrew text (see Syriac); Masoretic Text <i>the earth</i></span></li>
<li id="fen-NIV-36b"><a href="#en-NIV-36" title="Go to Genesis 1:27">Genesis 1:27</a> <span class='footnote-text'>See <a class="bibleref" href="/passage/?search=Gen+5:2">Gen 5:2</a>.</span></li>
</ol>
</div>
</div>"##;

    #[test]
    fn test_extracts_entries_in_order() {
        let result = extract_footnotes(FOOTNOTES).unwrap();
        assert!(result.starts_with("---\n\n#### Footnotes\n\n"));
        let a = result.find("**a.** Genesis 1:26 Probable reading").unwrap();
        let b = result.find("**b.** Genesis 1:27 See Gen 5:2.").unwrap();
        assert!(a < b);
        assert!(result.contains("Masoretic Text the earth"));
        assert!(!result.contains("<p id="));
        assert!(!result.contains("<sup>"));
    }

    #[test]
    fn test_cross_reference_items_excluded() {
        let html = r#"<ol class="footnotes-list"><li id="fen-NIV-1a">Note</li><li id="cen-NIV-1A">Gen 2:4</li></ol>"#;
        let result = extract_footnotes(html).unwrap();
        assert!(result.contains("**a.** Note"));
        assert!(!result.contains("Gen 2:4"));
    }

    #[test]
    fn test_list_inside_container_rendered_once() {
        let html = r#"<div class="footnotes"><ol class="footnotes"><li id="fen-NIV-1a">Or <i>light</i></li></ol></div></div>"#;
        let result = extract_footnotes(html).unwrap();
        assert_eq!(result, "---\n\n#### Footnotes\n\n**a.** Or light");
    }

    #[test]
    fn test_no_entries_is_absent() {
        assert_eq!(extract_footnotes("<p>no notes</p>"), None);
        assert_eq!(extract_footnotes(r#"<div class="footnotes"><ol></ol></div></div>"#), None);
        assert_eq!(process_footnotes_html(r#"<li id="cen-NIV-1A">x</li>"#), None);
    }

    #[test]
    fn test_container_ends_at_publisher_block() {
        let html = r#"<div class="footnotes"><li id="fen-NIV-1a">one</li><div class="publisher-info"><li id="fen-NIV-2b">two</li>"#;
        let result = extract_footnotes(html).unwrap();
        assert!(result.contains("**a.** one"));
        assert!(!result.contains("two"));
    }

    #[test]
    fn test_letter_is_trailing_run_in_either_case() {
        assert_eq!(footnote_letter("fen-NIV-26a"), "a");
        assert_eq!(footnote_letter("fen-ESV-1000ab"), "ab");
        assert_eq!(footnote_letter("fen-NIV-26A"), "A");
        assert_eq!(footnote_letter("fen-NIV-26"), "");
        assert_eq!(
            process_footnotes_html(r#"<li id="fen-NIV-26A">x</li>"#).unwrap(),
            "---\n\n#### Footnotes\n\n**A.** x"
        );
    }

    #[test]
    fn test_text_decoded_and_sanitized() {
        let html = r#"<li id="fen-X-1a">God&rsquo;s &#27;[31m  word
 here</li>"#;
        let result = process_footnotes_html(html).unwrap();
        assert!(result.ends_with("**a.** God's \u{FFFD}[31m word here"));
    }

    #[test]
    fn test_many_unterminated_containers_are_linear() {
        let html = r#"<div class="footnotes"><li id="fen-X-1a">"#.repeat(20_000);
        let start = Instant::now();
        extract_footnotes(&html);
        assert!(start.elapsed().as_millis() < 1000);
    }
}
