//! HTML character reference decoding.
//!
//! Named, decimal and hexadecimal references are all recognized by one
//! pattern and replaced in a single left-to-right pass, so the cost is linear
//! in the input length no matter how dense the references are.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Replacement for code points that must not reach the output.
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Named entity table.
///
/// Typographic quotes decode to plain ASCII quotes, and `nbsp` to a regular
/// space; Markdown output is easier to diff and search that way.
pub const NAMED_ENTITIES: &[(&str, &str)] = &[
    // Whitespace and markup
    ("nbsp", " "),
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    // Quotes (normalized to ASCII)
    ("lsquo", "'"),
    ("rsquo", "'"),
    ("ldquo", "\""),
    ("rdquo", "\""),
    // Dashes and ellipsis
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("hellip", "\u{2026}"),
    // Symbols
    ("copy", "\u{00A9}"),
    ("reg", "\u{00AE}"),
    ("trade", "\u{2122}"),
    ("deg", "\u{00B0}"),
    // Fractions
    ("frac12", "\u{00BD}"),
    ("frac14", "\u{00BC}"),
    ("frac34", "\u{00BE}"),
    // Currency
    ("euro", "\u{20AC}"),
    ("pound", "\u{00A3}"),
    ("yen", "\u{00A5}"),
    ("cent", "\u{00A2}"),
    ("curren", "\u{00A4}"),
    // Legal and typographic
    ("sect", "\u{00A7}"),
    ("para", "\u{00B6}"),
    ("laquo", "\u{00AB}"),
    ("raquo", "\u{00BB}"),
    ("bull", "\u{2022}"),
    ("middot", "\u{00B7}"),
    ("dagger", "\u{2020}"),
    ("Dagger", "\u{2021}"),
    ("permil", "\u{2030}"),
    ("prime", "\u{2032}"),
    ("Prime", "\u{2033}"),
    ("brvbar", "\u{00A6}"),
    ("shy", "\u{00AD}"),
    // Math
    ("times", "\u{00D7}"),
    ("divide", "\u{00F7}"),
    ("plusmn", "\u{00B1}"),
    ("micro", "\u{00B5}"),
    ("sup1", "\u{00B9}"),
    ("sup2", "\u{00B2}"),
    ("sup3", "\u{00B3}"),
    // Inverted punctuation
    ("iexcl", "\u{00A1}"),
    ("iquest", "\u{00BF}"),
];

static ENTITY_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| NAMED_ENTITIES.iter().copied().collect());

static RE_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([A-Za-z][A-Za-z0-9]*));").unwrap()
});

/// Decodes HTML character references.
///
/// Unknown named references are kept verbatim. Numeric references pass
/// through [`safe_char_from_code`], so escapes cannot smuggle control
/// characters into the output.
///
/// # Example
///
/// ```
/// use bibleurl::entities::decode_entities;
///
/// assert_eq!(decode_entities("God&rsquo;s word"), "God's word");
/// assert_eq!(decode_entities("&bogus;"), "&bogus;");
/// ```
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    RE_ENTITY
        .replace_all(text, |caps: &Captures| {
            if let Some(hex) = caps.get(1) {
                return decode_numeric(hex.as_str(), 16).to_string();
            }
            if let Some(dec) = caps.get(2) {
                return decode_numeric(dec.as_str(), 10).to_string();
            }
            let name = &caps[3];
            match ENTITY_MAP.get(name) {
                Some(decoded) => (*decoded).to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn decode_numeric(digits: &str, radix: u32) -> char {
    // Overflowing references are not valid code points either.
    match u32::from_str_radix(digits, radix) {
        Ok(code) => safe_char_from_code(code),
        Err(_) => REPLACEMENT_CHAR,
    }
}

/// Converts a code point to a character, filtering control characters.
///
/// Tab, LF and CR pass through. The rest of C0, DEL and C1 become
/// [`REPLACEMENT_CHAR`], as do surrogates and values past U+10FFFF. Every
/// other scalar value, noncharacters included, passes through unchanged.
pub fn safe_char_from_code(code: u32) -> char {
    match code {
        0x09 | 0x0A | 0x0D => code as u8 as char,
        0x00..=0x1F | 0x7F..=0x9F => REPLACEMENT_CHAR,
        _ => char::from_u32(code).unwrap_or(REPLACEMENT_CHAR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_every_named_entity() {
        let expected: &[(&str, &str)] = &[
            ("&nbsp;", " "),
            ("&amp;", "&"),
            ("&lt;", "<"),
            ("&gt;", ">"),
            ("&quot;", "\""),
            ("&apos;", "'"),
            ("&lsquo;", "'"),
            ("&rsquo;", "'"),
            ("&ldquo;", "\""),
            ("&rdquo;", "\""),
            ("&mdash;", "—"),
            ("&ndash;", "–"),
            ("&hellip;", "…"),
            ("&copy;", "©"),
            ("&reg;", "®"),
            ("&trade;", "™"),
            ("&deg;", "°"),
            ("&frac12;", "½"),
            ("&frac14;", "¼"),
            ("&frac34;", "¾"),
            ("&euro;", "€"),
            ("&pound;", "£"),
            ("&yen;", "¥"),
            ("&cent;", "¢"),
            ("&curren;", "¤"),
            ("&sect;", "§"),
            ("&para;", "¶"),
            ("&laquo;", "«"),
            ("&raquo;", "»"),
            ("&bull;", "•"),
            ("&middot;", "·"),
            ("&dagger;", "†"),
            ("&Dagger;", "‡"),
            ("&permil;", "‰"),
            ("&prime;", "′"),
            ("&Prime;", "″"),
            ("&brvbar;", "¦"),
            ("&shy;", "\u{AD}"),
            ("&times;", "×"),
            ("&divide;", "÷"),
            ("&plusmn;", "±"),
            ("&micro;", "µ"),
            ("&sup1;", "¹"),
            ("&sup2;", "²"),
            ("&sup3;", "³"),
            ("&iexcl;", "¡"),
            ("&iquest;", "¿"),
        ];
        assert_eq!(expected.len(), NAMED_ENTITIES.len());
        for (input, output) in expected {
            assert_eq!(decode_entities(input), *output, "decoding {input}");
        }
    }

    #[test]
    fn test_numeric_and_hex() {
        assert_eq!(decode_entities("&#65;&#97;"), "Aa");
        assert_eq!(decode_entities("&#x41;&#X61;"), "Aa");
        assert_eq!(decode_entities("&#39;"), "'");
        assert_eq!(decode_entities("&#x1F600;"), "😀");
    }

    #[test]
    fn test_control_characters_replaced() {
        for code in (0..=8).chain(11..=12).chain(14..=31).chain([127]).chain(128..=159) {
            assert_eq!(
                decode_entities(&format!("&#{code};")),
                "\u{FFFD}",
                "code point {code}"
            );
            assert_eq!(decode_entities(&format!("&#x{code:X};")), "\u{FFFD}");
        }
        assert_eq!(decode_entities("&#9;"), "\t");
        assert_eq!(decode_entities("&#10;"), "\n");
        assert_eq!(decode_entities("&#13;"), "\r");
        assert_eq!(decode_entities("&#x1B;[31m"), "\u{FFFD}[31m");
    }

    #[test]
    fn test_invalid_code_points() {
        assert_eq!(decode_entities("&#xD800;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#xDFFF;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#x110000;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#99999999999999999999;"), "\u{FFFD}");
    }

    #[test]
    fn test_noncharacters_pass_through() {
        assert_eq!(
            decode_entities("&#xFFFE;&#xFDD0;&#65535;"),
            "\u{FFFE}\u{FDD0}\u{FFFF}"
        );
        assert_eq!(decode_entities("&#x10FFFF;&#xE000;"), "\u{10FFFF}\u{E000}");
    }

    #[test]
    fn test_unknown_entities_kept() {
        assert_eq!(decode_entities("&unknownentity;"), "&unknownentity;");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&amp"), "&amp");
    }

    #[test]
    fn test_single_pass() {
        // Decoded output is not scanned again.
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(
            decode_entities("&ldquo;Hello&rdquo; &mdash; World &amp; All"),
            "\"Hello\" — World & All"
        );
    }

    #[test]
    fn test_one_megabyte_is_fast() {
        let segment = "He said &ldquo;hello&rdquo; &amp; &lsquo;world&rsquo; &#65; &#x42; &nbsp; &mdash; &copy; &euro; text ";
        let input = segment.repeat(1_000_000 / segment.len() + 1);

        let start = Instant::now();
        let result = decode_entities(&input);
        let elapsed = start.elapsed();

        assert!(elapsed.as_millis() < 1000, "took {elapsed:?}");
        assert!(!result.contains("&ldquo;"));
        assert!(!result.contains("&nbsp;"));
        assert!(result.contains("A B"));
    }
}
