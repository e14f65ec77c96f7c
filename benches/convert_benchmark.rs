//! Benchmarks for passage conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks convert synthetic passage pages of various sizes, plus
//! inputs built to defeat naive pattern matching.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Creates a synthetic passage page with the given number of verses.
fn create_test_page(verse_count: usize) -> String {
    let mut page = String::from(
        r#"<html><body><div class="passage-table"><div class="passage-col version-NIV">
<div class="bcv"><div class="dropdown-display-text">Genesis 1</div></div>
<div class="translation"><div class="dropdown-display-text">New International Version</div></div>
<div class="passage-text"><div class="passage-content"><div class="version-NIV result-text-style-normal">
<h3><span class="text">The Beginning</span></h3>"#,
    );

    for i in 1..=verse_count {
        page.push_str(&format!(
            r#"<p class="verse"><span class="text Gen-1-{i}"><sup class="versenum">{i}&nbsp;</sup>And God said, &ldquo;Let there be light,&rdquo; and there was light.<sup class="footnote" data-fn="#fen-NIV-{i}a">[<a href="#fen-NIV-{i}a">a</a>]</sup><sup class="crossreference" data-cr="#cen-NIV-{i}A">(<a href="#cen-NIV-{i}A">A</a>)</sup></span></p>
"#
        ));
    }

    page.push_str("</div></div></div>\n<div class=\"footnotes\"><h4>Footnotes</h4><ol class=\"footnotes\">\n");
    for i in 1..=verse_count {
        page.push_str(&format!(
            r#"<li id="fen-NIV-{i}a"><a href="#en-NIV-{i}">Genesis 1:{i}</a> <span class="footnote-text">Or <i>expanse</i></span></li>
"#
        ));
    }
    page.push_str("</ol></div>\n</div></div></body></html>");
    page
}

/// Benchmark full-page conversion at various sizes.
fn bench_page_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_conversion");

    for verse_count in [10, 100, 500, 1000].iter() {
        let page = create_test_page(*verse_count);
        group.throughput(Throughput::Bytes(page.len() as u64));

        group.bench_with_input(BenchmarkId::new("verses", verse_count), &page, |b, page| {
            b.iter(|| {
                let _ = bibleurl::to_markdown(black_box(page));
            });
        });
    }

    group.finish();
}

/// Benchmark the passage rules on a single block.
fn bench_passage_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("passage_rules");

    for verse_count in [10, 100, 1000].iter() {
        let page = create_test_page(*verse_count);
        group.throughput(Throughput::Bytes(page.len() as u64));

        group.bench_with_input(BenchmarkId::new("verses", verse_count), &page, |b, page| {
            b.iter(|| bibleurl::html::process_passage_html(black_box(page)));
        });
    }

    group.finish();
}

/// Benchmark entity decoding.
fn bench_entity_decoding(c: &mut Criterion) {
    let text = "&ldquo;Grace&rdquo; &amp; peace &#8212; &#x2014; &nbsp;&hellip; ".repeat(2000);

    c.bench_function("decode_entities", |b| {
        b.iter(|| bibleurl::entities::decode_entities(black_box(&text)));
    });
}

/// Benchmark inputs that trigger backtracking in naive matchers.
fn bench_adversarial(c: &mut Criterion) {
    let mut group = c.benchmark_group("adversarial");

    let inputs = [
        ("unclosed_versenum", r#"<sup class="versenum">"#.repeat(2000)),
        ("unclosed_passage_text", r#"<div class="passage-text">"#.repeat(2000)),
        ("nested_divs", format!("{}{}", "<div>".repeat(5000), "</div>".repeat(5000))),
        ("unterminated_entities", "&#x".repeat(10_000)),
    ];

    for (name, input) in inputs.iter() {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| {
                let _ = bibleurl::to_markdown(black_box(input));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_page_conversion,
    bench_passage_rules,
    bench_entity_decoding,
    bench_adversarial,
);

criterion_main!(benches);
