//! Personal library membership
//!
//! The membership set mirrors the backend. It is never toggled locally:
//! every successful add or remove is followed by a full refresh that
//! replaces the set with the backend's own list.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::gateway::Backend;
use crate::models::BookEntry;
use crate::normalize::normalize_all;
use crate::session::SessionState;

/// Keys of the books the user owns, as last reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet {
    keys: HashSet<String>,
}

impl MembershipSet {
    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<String> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().filter(|key| !key.is_empty()).collect(),
        }
    }
}

/// Sole writer of the [`MembershipSet`]
#[derive(Debug, Default)]
pub struct MembershipTracker {
    set: MembershipSet,
}

impl MembershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) -> &MembershipSet {
        &self.set
    }

    /// Number of books in the user's library
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Add a book to the personal library
    ///
    /// Returns false without a network call for guests and for entries
    /// without a key.
    pub fn add<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        session: &SessionState,
        entry: &BookEntry,
    ) -> bool {
        let Some(credentials) = session.credentials() else {
            return false;
        };
        if !entry.has_key() {
            debug!("Not adding '{}': entry has no key", entry.title());
            return false;
        }

        if !backend.add_book(credentials, entry) {
            return false;
        }
        info!("Added '{}' to library", entry.key());
        self.refresh_full(backend, session);
        true
    }

    /// Remove a book from the personal library
    pub fn remove<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        session: &SessionState,
        entry: &BookEntry,
    ) -> bool {
        let Some(credentials) = session.credentials() else {
            return false;
        };
        if !entry.has_key() {
            return false;
        }

        if !backend.remove_book(credentials, entry.key()) {
            return false;
        }
        info!("Removed '{}' from library", entry.key());
        self.refresh_full(backend, session);
        true
    }

    /// Remove a member, add a non-member
    pub fn toggle<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        session: &SessionState,
        entry: &BookEntry,
        is_member: bool,
    ) -> bool {
        if is_member {
            self.remove(backend, session, entry)
        } else {
            self.add(backend, session, entry)
        }
    }

    /// Replace the set with the backend's full library
    ///
    /// On failure the previous set is kept and false is returned.
    pub fn refresh_full<B: Backend + ?Sized>(&mut self, backend: &B, session: &SessionState) -> bool {
        let Some(credentials) = session.credentials() else {
            return false;
        };
        let Some(raw) = backend.search_library(credentials, "") else {
            return false;
        };

        self.set = normalize_all(raw)
            .into_iter()
            .map(|entry| entry.key().to_string())
            .collect();
        debug!("Membership refreshed: {} book(s)", self.set.len());
        true
    }

    /// Forget all membership, e.g. on logout
    pub fn clear(&mut self) {
        self.set = MembershipSet::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionManager;
    use crate::testing::FakeBackend;
    use crate::wire::{CatalogDoc, RawBook};

    fn entry(key: &str) -> BookEntry {
        crate::normalize::normalize(RawBook::Catalog(CatalogDoc {
            title: Some(format!("Book {}", key)),
            key: Some(key.to_string()),
            ..CatalogDoc::default()
        }))
    }

    fn logged_in(backend: &FakeBackend) -> SessionState {
        let mut session = SessionManager::new();
        session.login(backend, "reader", "pass123");
        session.state().clone()
    }

    #[test]
    fn test_guest_issues_no_calls() {
        let backend = FakeBackend::new();
        let mut tracker = MembershipTracker::new();
        let guest = SessionState::Guest;

        assert!(!tracker.add(&backend, &guest, &entry("k1")));
        assert!(!tracker.remove(&backend, &guest, &entry("k1")));
        assert!(!tracker.refresh_full(&backend, &guest));
        assert_eq!(backend.network_calls(), 0);
    }

    #[test]
    fn test_add_refreshes_from_backend() {
        let backend = FakeBackend::new().with_library(&[("Existing", "k0")]);
        let session = logged_in(&backend);
        let mut tracker = MembershipTracker::new();

        assert!(tracker.add(&backend, &session, &entry("k1")));

        assert_eq!(backend.add_calls.get(), 1);
        assert_eq!(backend.library_calls.get(), 1);
        assert!(tracker.set().contains("k1"));
        // The snapshot also carries books added elsewhere
        assert!(tracker.set().contains("k0"));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_remove_refreshes_from_backend() {
        let backend = FakeBackend::new().with_library(&[("One", "k1"), ("Two", "k2")]);
        let session = logged_in(&backend);
        let mut tracker = MembershipTracker::new();
        tracker.refresh_full(&backend, &session);

        assert!(tracker.remove(&backend, &session, &entry("k1")));

        assert!(!tracker.set().contains("k1"));
        assert!(tracker.set().contains("k2"));
    }

    #[test]
    fn test_failed_mutation_leaves_set_unchanged() {
        let backend = FakeBackend::new().with_library(&[("One", "k1")]);
        let session = logged_in(&backend);
        let mut tracker = MembershipTracker::new();
        tracker.refresh_full(&backend, &session);
        let before = tracker.set().clone();
        let refreshes = backend.library_calls.get();

        backend.fail_mutations.set(true);
        assert!(!tracker.add(&backend, &session, &entry("k2")));
        assert!(!tracker.remove(&backend, &session, &entry("k1")));

        assert_eq!(tracker.set(), &before);
        assert_eq!(backend.library_calls.get(), refreshes);
    }

    #[test]
    fn test_set_matches_backend_not_local_toggle() {
        let backend = FakeBackend::new().with_library(&[("Old", "k0")]);
        let session = logged_in(&backend);
        let mut tracker = MembershipTracker::new();
        tracker.refresh_full(&backend, &session);
        assert!(tracker.set().contains("k0"));

        // Removed from another client between our calls
        backend.library.borrow_mut().remove("k0");
        assert!(tracker.add(&backend, &session, &entry("k1")));

        assert!(tracker.set().contains("k1"));
        assert!(!tracker.set().contains("k0"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_set() {
        let backend = FakeBackend::new().with_library(&[("One", "k1")]);
        let session = logged_in(&backend);
        let mut tracker = MembershipTracker::new();
        tracker.refresh_full(&backend, &session);

        backend.fail_library.set(true);
        assert!(!tracker.refresh_full(&backend, &session));
        assert!(tracker.set().contains("k1"));
    }

    #[test]
    fn test_add_without_key_is_refused() {
        let backend = FakeBackend::new();
        let session = logged_in(&backend);
        let mut tracker = MembershipTracker::new();
        let calls = backend.network_calls();

        assert!(!tracker.add(&backend, &session, &entry("")));
        assert_eq!(backend.network_calls(), calls);
    }

    #[test]
    fn test_toggle() {
        let backend = FakeBackend::new();
        let session = logged_in(&backend);
        let mut tracker = MembershipTracker::new();
        let book = entry("k1");

        assert!(tracker.toggle(&backend, &session, &book, false));
        assert!(tracker.set().contains("k1"));

        assert!(tracker.toggle(&backend, &session, &book, true));
        assert!(!tracker.set().contains("k1"));
    }

    #[test]
    fn test_clear() {
        let backend = FakeBackend::new().with_library(&[("One", "k1")]);
        let session = logged_in(&backend);
        let mut tracker = MembershipTracker::new();
        tracker.refresh_full(&backend, &session);

        tracker.clear();
        assert!(tracker.is_empty());
    }
}
