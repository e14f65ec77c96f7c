//! Passage HTML to Markdown.
//!
//! The rules below run in a fixed order and each one assumes the earlier
//! ones have already fired: headings are promoted before tags are stripped,
//! verse numbers become `<sup>N</sup>` before the strip pass keeps `<sup>`,
//! and entities are decoded only after all markup is gone.

use super::display::{replace_display_blocks, DisplayBlock};
use super::scan::{replace_elements, Element, Finder};
use crate::entities::{decode_entities, REPLACEMENT_CHAR};
use crate::sanitize::replace_control_chars;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Placeholder for one level of indentation.
///
/// Whitespace normalization would flatten literal spaces, so indentation is
/// carried as a control character and expanded at the very end. Entity
/// decoding never produces one, and a raw one in the input is replaced
/// before any rule runs.
const INDENT_MARK: &str = "\u{1}";
const INDENT_WIDTH: &str = "    ";

static RE_SUP_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</sup>").unwrap());
static RE_A_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</a>").unwrap());
static RE_H1_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</h1>").unwrap());
static RE_H2_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</h2>").unwrap());
static RE_H3_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</h3>").unwrap());
static RE_H4_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</h4>").unwrap());
static RE_SPAN_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</span>").unwrap());

static RE_CROSSREF_SUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<sup\b[^>]*class=['"][^'"]*crossref[^'"]*['"][^>]*>"#).unwrap()
});
static RE_CROSSREF_A: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\b[^>]*class=['"][^'"]*crossref[^'"]*['"][^>]*>"#).unwrap()
});

static RE_H1_BCV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<h1\b[^>]*class="[^"]*passage-display-bcv[^"]*"[^>]*>"#).unwrap()
});
static RE_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h2\b[^>]*>").unwrap());
static RE_H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h3\b[^>]*>").unwrap());
static RE_H4: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h4\b[^>]*>").unwrap());
static RE_HEADING_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*class="[^"]*heading[^"]*"[^>]*>"#).unwrap()
});

static RE_VERSENUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<sup\b[^>]*class="[^"]*versenum[^"]*"[^>]*>"#).unwrap()
});
static RE_CHAPTERNUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*class="[^"]*chapternum[^"]*"[^>]*>"#).unwrap()
});
/// Digits padded with whitespace or non-breaking spaces (raw or escaped).
static RE_NUMBER_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\s|&nbsp;|&#160;|&#xa0;)*(\d+)(?:\s|&nbsp;|&#160;|&#xa0;)*$").unwrap()
});

static RE_FOOTNOTE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<sup\b[^>]*data-fn=['"]#([^'"<>\s]+)['"][^>]*>"#).unwrap()
});
static RE_FOOTNOTE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:<a\b[^>]*>)([a-z]+)(?i:</a>)").unwrap());

static RE_INDENT_1: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*class="[^"]*indent-1[^"]*"[^>]*>"#).unwrap()
});
static RE_INDENT_2: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*class="[^"]*indent-2[^"]*"[^>]*>"#).unwrap()
});
static RE_POETRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*class="[^"]*poetry[^"]*"[^>]*>"#).unwrap()
});

static RE_BR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static RE_P_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<p\b[^>]*>").unwrap());
static RE_P_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p>").unwrap());

static RE_SMALL_CAPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*class="[^"]*small-caps[^"]*"[^>]*>"#).unwrap()
});

static RE_ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_CROSSREF_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([A-Z]{1,3}\)").unwrap());

static RE_MULTIPLE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static RE_SPACE_AFTER_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n +").unwrap());
static RE_SPACE_BEFORE_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +\n").unwrap());
static RE_SPACE_AFTER_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\x01+) +").unwrap());

/// Converts the inner HTML of one passage column to Markdown.
///
/// # Example
///
/// ```
/// use bibleurl::html::process_passage_html;
///
/// let md = process_passage_html(r#"<sup class="versenum">1</sup>In the beginning"#);
/// assert_eq!(md, "<sup>1</sup> In the beginning");
/// ```
pub fn process_passage_html(html: &str) -> String {
    let text = html.replace(INDENT_MARK, &REPLACEMENT_CHAR.to_string());

    // 1. Cross-reference markers, content included
    let text = replace_elements(&text, &RE_CROSSREF_SUP, &RE_SUP_CLOSE, |_, _| Some(String::new()));
    let text = replace_elements(&text, &RE_CROSSREF_A, &RE_A_CLOSE, |_, _| Some(String::new()));

    // 2. Passage and version headings
    let text = replace_display_blocks(&text, DisplayBlock::Passage, |label| format!("# {label}\n\n"));
    let text = replace_display_blocks(&text, DisplayBlock::Version, |label| format!("*{label}*\n\n"));
    let text = replace_elements(&text, &RE_H1_BCV, &RE_H1_CLOSE, |text, el| {
        plain_content(text, el).map(|t| format!("# {t}\n\n"))
    });

    // 3. Structural headings
    let text = replace_elements(&text, &RE_H2, &RE_H2_CLOSE, |text, el| {
        plain_content(text, el).map(|t| format!("## {t}\n\n"))
    });
    let text = replace_elements(&text, &RE_H3, &RE_H3_CLOSE, |text, el| {
        plain_content(text, el).map(|t| format!("### {t}\n\n"))
    });
    let text = replace_elements(&text, &RE_H4, &RE_H4_CLOSE, |text, el| {
        plain_content(text, el).map(|t| format!("#### {t}\n\n"))
    });
    let text = replace_elements(&text, &RE_HEADING_SPAN, &RE_SPAN_CLOSE, |text, el| {
        plain_content(text, el).map(|t| format!("\n\n### {t}\n\n"))
    });

    // 4-5. Verse and chapter numbers
    let text = replace_elements(&text, &RE_VERSENUM, &RE_SUP_CLOSE, |text, el| {
        number_content(text, el).map(|n| format!("<sup>{n}</sup> "))
    });
    let text = replace_elements(&text, &RE_CHAPTERNUM, &RE_SPAN_CLOSE, |text, el| {
        number_content(text, el).map(|n| format!("**{n}** "))
    });

    // 6. Footnote references stay clickable
    let text = render_footnote_refs(&text);

    // 7. Poetry and indentation
    let text = RE_INDENT_1.replace_all(&text, INDENT_MARK);
    let text = RE_INDENT_2.replace_all(&text, INDENT_MARK.repeat(2));
    let text = RE_POETRY.replace_all(&text, "> ");

    // 8. Line breaks and paragraphs
    let text = RE_BR.replace_all(&text, "\n");
    let text = RE_P_OPEN.replace_all(&text, "\n\n");
    let text = RE_P_CLOSE.replace_all(&text, "");

    // 9. Small caps
    let text = replace_elements(&text, &RE_SMALL_CAPS, &RE_SPAN_CLOSE, |text, el| {
        plain_content(text, el).map(str::to_string)
    });

    // 10. Everything else except <sup> and <a>
    let text = RE_ANY_TAG.replace_all(&text, |caps: &Captures| {
        if is_kept_tag(&caps[0]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });

    // 11. Residual (A)-style markers
    let text = RE_CROSSREF_MARKER.replace_all(&text, "");

    // 12. Entities, then control characters other than the indent marks
    let text = decode_entities(&text);
    let text = text
        .split(INDENT_MARK)
        .map(replace_control_chars)
        .collect::<Vec<_>>()
        .join(INDENT_MARK);

    // 13. Whitespace
    normalize_whitespace(&text)
}

/// Element content with no nested markup.
fn plain_content<'t>(text: &'t str, el: &Element<'_>) -> Option<&'t str> {
    let inner = &text[el.inner.clone()];
    (!inner.is_empty() && !inner.contains('<')).then_some(inner)
}

fn number_content<'t>(text: &'t str, el: &Element<'_>) -> Option<&'t str> {
    let inner = &text[el.inner.clone()];
    RE_NUMBER_CONTENT
        .captures(inner)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `<sup data-fn="#id">…<a>b</a>…</sup>` becomes `<sup><a href="#id">b</a></sup>`.
fn render_footnote_refs(text: &str) -> String {
    let mut links = Finder::new(text, &RE_FOOTNOTE_LINK);
    replace_elements(text, &RE_FOOTNOTE_REF, &RE_SUP_CLOSE, |text, el| {
        let link = links.find_from(el.inner.start)?;
        if link.end > el.inner.end {
            return None;
        }
        let letter = RE_FOOTNOTE_LINK.captures(&text[link])?.get(1)?.as_str();
        let id = el.caps.get(1)?.as_str();
        Some(format!("<sup><a href=\"#{id}\">{letter}</a></sup>"))
    })
}

/// Tags that survive stripping: `<sup>`, `</sup>`, `<a …>` and `</a>`.
fn is_kept_tag(tag: &str) -> bool {
    let body = &tag[1..];
    let sup = body.strip_prefix('/').unwrap_or(body);
    if let Some(after) = sup.strip_prefix("sup") {
        if after.starts_with('>') || after.starts_with(char::is_whitespace) {
            return true;
        }
    }
    if body == "/a>" {
        return true;
    }
    body.strip_prefix('a')
        .is_some_and(|after| after.starts_with(char::is_whitespace))
}

fn normalize_whitespace(text: &str) -> String {
    let text = RE_MULTIPLE_NEWLINES.replace_all(text, "\n\n");
    let text = RE_HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = RE_SPACE_AFTER_NEWLINE.replace_all(&text, "\n");
    let text = RE_SPACE_BEFORE_NEWLINE.replace_all(&text, "\n");
    let text = RE_SPACE_AFTER_INDENT.replace_all(text.trim(), "$1");
    text.replace(INDENT_MARK, INDENT_WIDTH)
}
