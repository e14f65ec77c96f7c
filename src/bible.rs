//! Protestant canon, split into the three reading tracks.

use serde::Serialize;

/// A book and its chapter count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Book {
    pub name: &'static str,
    pub chapters: u32,
}

const fn book(name: &'static str, chapters: u32) -> Book {
    Book { name, chapters }
}

/// Old Testament, Genesis through Malachi.
pub const OT: &[Book] = &[
    book("Genesis", 50),
    book("Exodus", 40),
    book("Leviticus", 27),
    book("Numbers", 36),
    book("Deuteronomy", 34),
    book("Joshua", 24),
    book("Judges", 21),
    book("Ruth", 4),
    book("1 Samuel", 31),
    book("2 Samuel", 24),
    book("1 Kings", 22),
    book("2 Kings", 25),
    book("1 Chronicles", 29),
    book("2 Chronicles", 36),
    book("Ezra", 10),
    book("Nehemiah", 13),
    book("Esther", 10),
    book("Job", 42),
    book("Psalms", 150),
    book("Proverbs", 31),
    book("Ecclesiastes", 12),
    book("Song of Songs", 8),
    book("Isaiah", 66),
    book("Jeremiah", 52),
    book("Lamentations", 5),
    book("Ezekiel", 48),
    book("Daniel", 12),
    book("Hosea", 14),
    book("Joel", 3),
    book("Amos", 9),
    book("Obadiah", 1),
    book("Jonah", 4),
    book("Micah", 7),
    book("Nahum", 3),
    book("Habakkuk", 3),
    book("Zephaniah", 3),
    book("Haggai", 2),
    book("Zechariah", 14),
    book("Malachi", 4),
];

/// Matthew, Mark, Luke and John.
pub const GOSPELS: &[Book] = &[
    book("Matthew", 28),
    book("Mark", 16),
    book("Luke", 24),
    book("John", 21),
];

/// Acts through Revelation.
pub const NT_REST: &[Book] = &[
    book("Acts", 28),
    book("Romans", 16),
    book("1 Corinthians", 16),
    book("2 Corinthians", 13),
    book("Galatians", 6),
    book("Ephesians", 6),
    book("Philippians", 4),
    book("Colossians", 4),
    book("1 Thessalonians", 5),
    book("2 Thessalonians", 3),
    book("1 Timothy", 6),
    book("2 Timothy", 4),
    book("Titus", 3),
    book("Philemon", 1),
    book("Hebrews", 13),
    book("James", 5),
    book("1 Peter", 5),
    book("2 Peter", 3),
    book("1 John", 5),
    book("2 John", 1),
    book("3 John", 1),
    book("Jude", 1),
    book("Revelation", 22),
];
