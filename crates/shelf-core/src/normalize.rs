//! Normalization of raw search results into [`BookEntry`]
//!
//! The catalog and the personal library use different shapes. Both are
//! folded into one entry type here so nothing downstream branches on the
//! source.

use crate::models::{BookEntry, UNKNOWN};
use crate::wire::{AuthorField, CatalogDoc, LibraryBook, RawBook};

/// Normalize a raw entry from either source
pub fn normalize(raw: RawBook) -> BookEntry {
    match raw {
        RawBook::Catalog(doc) => from_catalog(doc),
        RawBook::Library(book) => from_library(book),
    }
}

/// Normalize a batch, keeping order
pub fn normalize_all(raw: Vec<RawBook>) -> Vec<BookEntry> {
    raw.into_iter().map(normalize).collect()
}

fn from_catalog(doc: CatalogDoc) -> BookEntry {
    // Only the first credited author is shown
    let author = match doc.author_name {
        Some(AuthorField::Many(names)) => names.into_iter().next(),
        Some(AuthorField::One(name)) => Some(name),
        None => None,
    };

    BookEntry::new(
        doc.title.unwrap_or_default(),
        author_or_unknown(author),
        doc.first_publish_year.unwrap_or_default(),
        doc.cover_i.unwrap_or(0),
        doc.key.unwrap_or_default(),
        doc.language.unwrap_or_default(),
    )
}

fn from_library(book: LibraryBook) -> BookEntry {
    BookEntry::new(
        book.title.unwrap_or_default(),
        author_or_unknown(book.author),
        book.year.unwrap_or_default(),
        book.cover_i.unwrap_or(0),
        book.key.unwrap_or_default(),
        book.language.unwrap_or_default(),
    )
}

fn author_or_unknown(author: Option<String>) -> String {
    author
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Language, Year};
    use serde_json::json;

    fn catalog(value: serde_json::Value) -> BookEntry {
        normalize(RawBook::Catalog(serde_json::from_value(value).unwrap()))
    }

    fn library(value: serde_json::Value) -> BookEntry {
        normalize(RawBook::Library(serde_json::from_value(value).unwrap()))
    }

    #[test]
    fn test_catalog_title_only_gets_defaults() {
        let entry = catalog(json!({"title": "X"}));

        assert_eq!(entry.title(), "X");
        assert_eq!(entry.author(), "Unknown");
        assert_eq!(entry.year(), Year::Unknown);
        assert_eq!(entry.cover_id(), 0);
        assert_eq!(entry.key(), "");
        assert_eq!(entry.language(), &Language::One(String::new()));
    }

    #[test]
    fn test_catalog_full_entry() {
        let entry = catalog(json!({
            "title": "Python Cookbook",
            "author_name": ["David Beazley", "Brian Jones"],
            "first_publish_year": 2013,
            "cover_i": 12345,
            "key": "/works/OL12345W",
            "language": ["eng"]
        }));

        assert_eq!(entry.title(), "Python Cookbook");
        assert_eq!(entry.author(), "David Beazley");
        assert_eq!(entry.year(), Year::Known(2013));
        assert_eq!(entry.cover_id(), 12345);
        assert_eq!(entry.key(), "/works/OL12345W");
        assert_eq!(entry.language(), &Language::Many(vec!["eng".to_string()]));
    }

    #[test]
    fn test_catalog_author_variants() {
        assert_eq!(catalog(json!({"author_name": "Solo"})).author(), "Solo");
        assert_eq!(catalog(json!({"author_name": []})).author(), "Unknown");
        assert_eq!(catalog(json!({"author_name": ["  "]})).author(), "Unknown");
    }

    #[test]
    fn test_library_shape() {
        let entry = library(json!({
            "title": "Python Basics",
            "author": "John Doe",
            "year": 2020,
            "key": "python_basics_123"
        }));

        assert_eq!(entry.author(), "John Doe");
        assert_eq!(entry.year(), Year::Known(2020));
        assert_eq!(entry.key(), "python_basics_123");
        assert_eq!(entry.cover_id(), 0);
    }

    #[test]
    fn test_same_book_from_both_sources_matches_on_key() {
        let from_catalog = catalog(json!({"title": "T", "key": "/works/OL1W"}));
        let from_library = library(json!({"title": "T", "key": "/works/OL1W"}));

        assert_eq!(from_catalog.key(), from_library.key());
    }
}
