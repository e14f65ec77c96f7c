//! HTML to Markdown conversion for passage pages.
//!
//! Conversion is a fixed sequence of bounded pattern rewrites rather than a
//! DOM build. Every "content up to the closing tag" match is a tag-local
//! pattern plus a forward search for the closing sequence, so the total
//! work stays linear in the page size even for hostile markup.

mod display;
mod document;
mod footnotes;
mod passage;
mod scan;

pub use display::{find_display_label, DisplayBlock};
pub use document::{
    parse_html_to_markdown, parse_html_to_markdown_with_options, ConversionContext,
    PARSE_FALLBACK_MESSAGE, PARSE_TIMEOUT,
};
pub use footnotes::{extract_footnotes, process_footnotes_html, FOOTNOTES_HEADER};
pub use passage::process_passage_html;
