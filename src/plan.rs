//! Daily reading generation.
//!
//! Each track (Old Testament, Gospels, Acts-Revelation) advances by its
//! own per-day count and wraps around independently.

use crate::bible::{Book, GOSPELS, NT_REST, OT};
use crate::chapters::{format_segments, pick_chapters, total_chapters, ChapterRef};
use crate::config::PlanConfig;
use crate::error::{Error, Result};
use crate::url::build_passage_url;
use serde::Serialize;

/// One day of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReading {
    pub day: u64,
    pub version: String,
    pub ot_refs: Vec<ChapterRef>,
    pub gospel_refs: Vec<ChapterRef>,
    pub nt_refs: Vec<ChapterRef>,
    /// Condensed ranges such as `Genesis 1-3`.
    pub segments: Vec<String>,
    /// `segments` joined with `", "`.
    pub search: String,
    pub url: String,
}

/// Builds the reading for `day` (1-based).
///
/// # Example
///
/// ```
/// use bibleurl::config::PlanConfig;
/// use bibleurl::plan::generate_daily_reading;
///
/// let reading = generate_daily_reading(1, "NIV", &PlanConfig::default()).unwrap();
/// assert_eq!(reading.search, "Genesis 1-3, Matthew 1, Acts 1");
/// ```
pub fn generate_daily_reading(day: u64, version: &str, config: &PlanConfig) -> Result<DailyReading> {
    if day == 0 {
        return Err(Error::Validation("Day must be a positive, safe integer.".to_string()));
    }

    let ot_refs = pick_track(OT, day, config.ot_chapters_per_day)?;
    let gospel_refs = pick_track(GOSPELS, day, config.gospel_chapters_per_day)?;
    let nt_refs = pick_track(NT_REST, day, config.nt_chapters_per_day)?;

    let segments: Vec<String> = [&ot_refs, &gospel_refs, &nt_refs]
        .into_iter()
        .flat_map(|refs| format_segments(refs))
        .collect();
    let search = segments.join(", ");
    let url = build_passage_url(&search, version, config);
    log::debug!("day {day}: {search}");

    Ok(DailyReading {
        day,
        version: version.to_string(),
        ot_refs,
        gospel_refs,
        nt_refs,
        segments,
        search,
        url,
    })
}

/// The chapters of one track for `day`.
///
/// The start offset `(day - 1) * per_day` is reduced modulo the track length
/// before multiplying, which keeps it in range for any `day`.
fn pick_track(corpus: &[Book], day: u64, per_day: u32) -> Result<Vec<ChapterRef>> {
    let total = u64::from(total_chapters(corpus));
    if total == 0 {
        return Err(Error::EmptyCorpus);
    }
    let start = ((day - 1) % total) * (u64::from(per_day) % total) % total;
    pick_chapters(corpus, start, per_day)
}
