//! Recording fake backend for tests
//!
//! Built for this crate's unit tests and, with the `test-utils` feature, for
//! front ends that drive a `LibraryContext` in their own tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::gateway::{AuthReply, Backend};
use crate::models::{BookEntry, Year};
use crate::session::Credentials;
use crate::wire::{CatalogDoc, LibraryBook, RawBook};

/// In-memory backend that counts every call
///
/// The library is keyed by book key, so it behaves like the real server
/// across add, remove and refresh.
#[derive(Default)]
pub struct FakeBackend {
    pub accept_login: Cell<bool>,
    pub fail_catalog: Cell<bool>,
    pub fail_library: Cell<bool>,
    pub fail_mutations: Cell<bool>,
    pub catalog: RefCell<Vec<CatalogDoc>>,
    pub library: RefCell<BTreeMap<String, LibraryBook>>,
    pub login_calls: Cell<usize>,
    pub register_calls: Cell<usize>,
    pub catalog_calls: Cell<usize>,
    pub library_calls: Cell<usize>,
    pub add_calls: Cell<usize>,
    pub remove_calls: Cell<usize>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.accept_login.set(true);
        backend
    }

    pub fn with_catalog(self, docs: &[(&str, &str)]) -> Self {
        *self.catalog.borrow_mut() = docs
            .iter()
            .map(|(title, key)| CatalogDoc {
                title: Some(title.to_string()),
                key: Some(key.to_string()),
                ..CatalogDoc::default()
            })
            .collect();
        self
    }

    pub fn with_library(self, books: &[(&str, &str)]) -> Self {
        for (title, key) in books {
            self.library.borrow_mut().insert(
                key.to_string(),
                LibraryBook {
                    title: Some(title.to_string()),
                    author: Some("Someone".to_string()),
                    year: Some(Year::Known(2000)),
                    key: Some(key.to_string()),
                    ..LibraryBook::default()
                },
            );
        }
        self
    }

    /// Whether the backend's library holds `key`
    pub fn owns(&self, key: &str) -> bool {
        self.library.borrow().contains_key(key)
    }

    pub fn network_calls(&self) -> usize {
        self.login_calls.get()
            + self.register_calls.get()
            + self.catalog_calls.get()
            + self.library_calls.get()
            + self.add_calls.get()
            + self.remove_calls.get()
    }

    fn auth(&self, username: &str) -> Option<AuthReply> {
        self.accept_login.get().then(|| AuthReply {
            user_id: format!("id-{}", username),
            message: None,
        })
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl Backend for FakeBackend {
    fn login(&self, username: &str, _password: &str) -> Option<AuthReply> {
        bump(&self.login_calls);
        self.auth(username)
    }

    fn register(&self, username: &str, _password: &str) -> Option<AuthReply> {
        bump(&self.register_calls);
        self.auth(username)
    }

    fn search_catalog(&self, query: &str) -> Option<Vec<RawBook>> {
        bump(&self.catalog_calls);
        if self.fail_catalog.get() {
            return None;
        }
        Some(
            self.catalog
                .borrow()
                .iter()
                .filter(|doc| title_matches(doc.title.as_deref(), query))
                .cloned()
                .map(RawBook::Catalog)
                .collect(),
        )
    }

    fn search_library(&self, _credentials: &Credentials, query: &str) -> Option<Vec<RawBook>> {
        bump(&self.library_calls);
        if self.fail_library.get() {
            return None;
        }
        Some(
            self.library
                .borrow()
                .values()
                .filter(|book| title_matches(book.title.as_deref(), query))
                .cloned()
                .map(RawBook::Library)
                .collect(),
        )
    }

    fn add_book(&self, _credentials: &Credentials, book: &BookEntry) -> bool {
        bump(&self.add_calls);
        if self.fail_mutations.get() {
            return false;
        }
        self.library.borrow_mut().insert(
            book.key().to_string(),
            LibraryBook {
                title: Some(book.title().to_string()),
                author: Some(book.author().to_string()),
                year: Some(book.year()),
                cover_i: Some(book.cover_id()),
                key: Some(book.key().to_string()),
                language: Some(book.language().clone()),
            },
        );
        true
    }

    fn remove_book(&self, _credentials: &Credentials, key: &str) -> bool {
        bump(&self.remove_calls);
        if self.fail_mutations.get() {
            return false;
        }
        self.library.borrow_mut().remove(key).is_some()
    }
}

fn title_matches(title: Option<&str>, query: &str) -> bool {
    query.is_empty()
        || title
            .unwrap_or_default()
            .to_lowercase()
            .contains(&query.to_lowercase())
}
