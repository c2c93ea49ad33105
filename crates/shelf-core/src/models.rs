//! Data models for Shelf
//!
//! `BookEntry` is the canonical shape every search result is normalized
//! into. Entries are immutable; the only way to build one is through
//! [`crate::normalize`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder used for missing authors and years
pub const UNKNOWN: &str = "Unknown";

/// First publication year of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Year {
    Known(i64),
    #[default]
    Unknown,
}

impl Year {
    pub fn known(self) -> Option<i64> {
        match self {
            Year::Known(year) => Some(year),
            Year::Unknown => None,
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Known(year) => write!(f, "{}", year),
            Year::Unknown => f.write_str(UNKNOWN),
        }
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Year::Known(year) => serializer.serialize_i64(*year),
            Year::Unknown => serializer.serialize_str(UNKNOWN),
        }
    }
}

impl<'de> Deserialize<'de> for Year {
    /// Accepts a number or a numeric string; any other string is `Unknown`
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i64),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Number(year) => Year::Known(year),
            Repr::Text(text) => text
                .trim()
                .parse()
                .map(Year::Known)
                .unwrap_or(Year::Unknown),
        })
    }
}

/// Language field: the catalog sends a list, the library may send either
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Language {
    One(String),
    Many(Vec<String>),
}

impl Default for Language {
    fn default() -> Self {
        Language::One(String::new())
    }
}

impl Language {
    pub fn is_empty(&self) -> bool {
        match self {
            Language::One(lang) => lang.is_empty(),
            Language::Many(langs) => langs.is_empty(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::One(lang) => f.write_str(lang),
            Language::Many(langs) => f.write_str(&langs.join(", ")),
        }
    }
}

/// A catalog or library item in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookEntry {
    title: String,
    author: String,
    year: Year,
    cover_id: i64,
    key: String,
    language: Language,
}

impl BookEntry {
    pub(crate) fn new(
        title: String,
        author: String,
        year: Year,
        cover_id: i64,
        key: String,
        language: Language,
    ) -> Self {
        Self {
            title,
            author,
            year,
            cover_id,
            key,
            language,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> Year {
        self.year
    }

    /// Open Library cover id (0 when there is no cover)
    pub fn cover_id(&self) -> i64 {
        self.cover_id
    }

    /// External key, e.g. `/works/OL27448W`. Empty when the source had none.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Whether this entry can be identified across sources
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}

/// A displayed entry with its membership flag at rebuild time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedBook {
    pub entry: BookEntry,
    pub is_member: bool,
}

/// Where the displayed list came from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListSource {
    #[default]
    Empty,
    Catalog { query: String },
    Library { query: String },
}

/// The ordered result set currently shown to the user
///
/// Rebuilt wholesale by the search coordinator; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedBookList {
    source: ListSource,
    books: Vec<DisplayedBook>,
}

impl DisplayedBookList {
    pub(crate) fn new(source: ListSource, books: Vec<DisplayedBook>) -> Self {
        Self { source, books }
    }

    pub fn source(&self) -> &ListSource {
        &self.source
    }

    pub fn books(&self) -> &[DisplayedBook] {
        &self.books
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DisplayedBook> {
        self.books.iter()
    }

    pub fn get(&self, index: usize) -> Option<&DisplayedBook> {
        self.books.get(index)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Index of the first entry with this key. Empty keys never match.
    pub fn position_of_key(&self, key: &str) -> Option<usize> {
        if key.is_empty() {
            return None;
        }
        self.books.iter().position(|book| book.entry.key() == key)
    }
}
