//! Chapter arithmetic over a corpus of books.
//!
//! A corpus is read as one flat run of chapters: index 0 is the first
//! chapter of the first book, and the run wraps around at the end.

use crate::bible::Book;
use crate::error::{Error, Result};
use serde::Serialize;

/// One chapter of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRef {
    pub book: &'static str,
    pub chapter: u32,
}

impl ChapterRef {
    pub fn new(book: &'static str, chapter: u32) -> Self {
        Self { book, chapter }
    }
}

/// Sum of chapter counts.
pub fn total_chapters(corpus: &[Book]) -> u32 {
    corpus.iter().map(|b| b.chapters).sum()
}

/// Maps a 0-based flat index to its book and 1-based chapter.
pub fn flat_index_to_ref(corpus: &[Book], index: u32) -> Result<ChapterRef> {
    let mut idx = index;
    for book in corpus {
        if idx < book.chapters {
            return Ok(ChapterRef::new(book.name, idx + 1));
        }
        idx -= book.chapters;
    }
    Err(Error::ChapterOutOfRange(index))
}

/// Takes `count` consecutive chapters starting at `start`, wrapping at the end.
///
/// # Example
///
/// ```
/// use bibleurl::bible::GOSPELS;
/// use bibleurl::chapters::pick_chapters;
///
/// let refs = pick_chapters(GOSPELS, 88, 2).unwrap();
/// assert_eq!((refs[0].book, refs[0].chapter), ("John", 21));
/// assert_eq!((refs[1].book, refs[1].chapter), ("Matthew", 1));
/// ```
pub fn pick_chapters(corpus: &[Book], start: u64, count: u32) -> Result<Vec<ChapterRef>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let total = u64::from(total_chapters(corpus));
    if total == 0 {
        return Err(Error::EmptyCorpus);
    }
    let start = start % total;
    (0..u64::from(count))
        .map(|i| {
            // Always below `total`, which itself fits in u32.
            let idx = ((start + i) % total) as u32;
            flat_index_to_ref(corpus, idx)
        })
        .collect()
}

/// Collapses runs of consecutive chapters: `Genesis 1, 2, 3` → `Genesis 1-3`.
pub fn format_segments(refs: &[ChapterRef]) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < refs.len() {
        let first = &refs[i];
        let mut j = i;
        while j + 1 < refs.len()
            && refs[j + 1].book == refs[j].book
            && refs[j + 1].chapter == refs[j].chapter + 1
        {
            j += 1;
        }
        let last = &refs[j];
        if j == i {
            out.push(format!("{} {}", first.book, first.chapter));
        } else {
            out.push(format!("{} {}-{}", first.book, first.chapter, last.chapter));
        }
        i = j + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bible::{GOSPELS, NT_REST, OT};

    #[test]
    fn test_flat_index_to_ref() {
        assert_eq!(flat_index_to_ref(OT, 0).unwrap(), ChapterRef::new("Genesis", 1));
        assert_eq!(flat_index_to_ref(OT, 49).unwrap(), ChapterRef::new("Genesis", 50));
        assert_eq!(flat_index_to_ref(OT, 50).unwrap(), ChapterRef::new("Exodus", 1));
        assert_eq!(flat_index_to_ref(OT, 928).unwrap(), ChapterRef::new("Malachi", 4));
        assert!(matches!(flat_index_to_ref(OT, 929), Err(Error::ChapterOutOfRange(929))));
    }

    #[test]
    fn test_pick_wraps_around() {
        let refs = pick_chapters(OT, 927, 3).unwrap();
        assert_eq!(
            refs,
            vec![
                ChapterRef::new("Malachi", 3),
                ChapterRef::new("Malachi", 4),
                ChapterRef::new("Genesis", 1),
            ]
        );
        // A start far past the end lands on the same chapter as its remainder.
        assert_eq!(pick_chapters(NT_REST, 171 * 1000 + 2, 1).unwrap(), pick_chapters(NT_REST, 2, 1).unwrap());
    }

    #[test]
    fn test_pick_edge_cases() {
        assert!(pick_chapters(GOSPELS, 0, 0).unwrap().is_empty());
        assert!(matches!(pick_chapters(&[], 0, 1), Err(Error::EmptyCorpus)));
    }

    #[test]
    fn test_format_segments() {
        let refs = vec![
            ChapterRef::new("Genesis", 1),
            ChapterRef::new("Genesis", 2),
            ChapterRef::new("Genesis", 3),
        ];
        assert_eq!(format_segments(&refs), vec!["Genesis 1-3"]);

        let refs = vec![
            ChapterRef::new("Malachi", 4),
            ChapterRef::new("Genesis", 1),
            ChapterRef::new("Genesis", 3),
        ];
        assert_eq!(format_segments(&refs), vec!["Malachi 4", "Genesis 1", "Genesis 3"]);

        assert!(format_segments(&[]).is_empty());
    }
}
