//! Search dispatch and displayed list rebuilding

use tracing::debug;

use crate::gateway::Backend;
use crate::membership::MembershipSet;
use crate::models::{BookEntry, DisplayedBook, DisplayedBookList, ListSource};
use crate::normalize::normalize_all;
use crate::session::SessionState;

/// Owns the [`DisplayedBookList`]
///
/// A failed search leaves the current list untouched.
#[derive(Debug, Default)]
pub struct SearchCoordinator {
    list: DisplayedBookList,
}

impl SearchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &DisplayedBookList {
        &self.list
    }

    /// Search the public catalog. Allowed for guests.
    ///
    /// Returns true if the list was rebuilt.
    pub fn search_catalog<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        membership: &MembershipSet,
        query: &str,
    ) -> bool {
        let Some(raw) = backend.search_catalog(query) else {
            return false;
        };

        let entries = normalize_all(raw);
        debug!("Catalog search '{}' returned {} book(s)", query, entries.len());
        self.list = flagged(
            ListSource::Catalog {
                query: query.to_string(),
            },
            entries,
            membership,
        );
        true
    }

    /// Search the user's own library. A guest session makes no call.
    pub fn search_personal_library<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        session: &SessionState,
        query: &str,
    ) -> bool {
        let Some(credentials) = session.credentials() else {
            return false;
        };
        let Some(raw) = backend.search_library(credentials, query) else {
            return false;
        };

        let entries = normalize_all(raw);
        debug!("Library search '{}' returned {} book(s)", query, entries.len());
        // Everything in the user's own library is a member
        let books = entries
            .into_iter()
            .map(|entry| DisplayedBook {
                entry,
                is_member: true,
            })
            .collect();
        self.list = DisplayedBookList::new(
            ListSource::Library {
                query: query.to_string(),
            },
            books,
        );
        true
    }

    /// Rebuild the list with the same entries and fresh membership flags
    pub fn reflag(&mut self, membership: &MembershipSet) {
        let entries = self.list.iter().map(|book| book.entry.clone()).collect();
        self.list = flagged(self.list.source().clone(), entries, membership);
    }

    /// Drop the current list
    pub fn reset(&mut self) {
        self.list = DisplayedBookList::default();
    }
}

fn flagged(
    source: ListSource,
    entries: Vec<BookEntry>,
    membership: &MembershipSet,
) -> DisplayedBookList {
    let books = entries
        .into_iter()
        .map(|entry| {
            let is_member = membership.contains(entry.key());
            DisplayedBook { entry, is_member }
        })
        .collect();
    DisplayedBookList::new(source, books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipTracker;
    use crate::session::SessionManager;
    use crate::testing::FakeBackend;

    fn membership_of(keys: &[&str]) -> MembershipSet {
        keys.iter().map(|key| key.to_string()).collect()
    }

    #[test]
    fn test_catalog_search_flags_members() {
        let backend = FakeBackend::new().with_catalog(&[
            ("Dune", "/works/OL1W"),
            ("Dune Messiah", "/works/OL2W"),
            ("Untracked Dune", ""),
        ]);
        let membership = membership_of(&["/works/OL2W"]);
        let mut search = SearchCoordinator::new();

        assert!(search.search_catalog(&backend, &membership, "dune"));

        let list = search.list();
        assert_eq!(list.len(), 3);
        for book in list.iter() {
            assert_eq!(book.is_member, membership.contains(book.entry.key()));
        }
        assert!(list.get(1).unwrap().is_member);
        assert_eq!(
            list.source(),
            &ListSource::Catalog {
                query: "dune".to_string()
            }
        );
    }

    #[test]
    fn test_catalog_search_allowed_for_guest() {
        let backend = FakeBackend::new().with_catalog(&[("Dune", "/works/OL1W")]);
        let mut search = SearchCoordinator::new();

        assert!(search.search_catalog(&backend, &MembershipSet::default(), ""));
        assert_eq!(backend.catalog_calls.get(), 1);
        assert!(!search.list().get(0).unwrap().is_member);
    }

    #[test]
    fn test_catalog_failure_keeps_list() {
        let backend = FakeBackend::new().with_catalog(&[("Dune", "/works/OL1W")]);
        let mut search = SearchCoordinator::new();
        search.search_catalog(&backend, &MembershipSet::default(), "dune");
        let before = search.list().clone();

        backend.fail_catalog.set(true);
        assert!(!search.search_catalog(&backend, &MembershipSet::default(), "other"));
        assert_eq!(search.list(), &before);
    }

    #[test]
    fn test_empty_result_clears_list() {
        let backend = FakeBackend::new().with_catalog(&[("Dune", "/works/OL1W")]);
        let mut search = SearchCoordinator::new();
        search.search_catalog(&backend, &MembershipSet::default(), "dune");

        assert!(search.search_catalog(&backend, &MembershipSet::default(), "nothing matches"));
        assert!(search.list().is_empty());
    }

    #[test]
    fn test_personal_search_guest_is_noop() {
        let backend = FakeBackend::new().with_library(&[("Mine", "k1")]);
        let mut search = SearchCoordinator::new();

        assert!(!search.search_personal_library(&backend, &SessionState::Guest, ""));
        assert_eq!(backend.network_calls(), 0);
        assert!(search.list().is_empty());
    }

    #[test]
    fn test_personal_search_marks_all_members() {
        let backend = FakeBackend::new().with_library(&[("Python Basics", "k1"), ("Rust", "k2")]);
        let mut session = SessionManager::new();
        session.login(&backend, "reader", "pass");
        let mut search = SearchCoordinator::new();

        assert!(search.search_personal_library(&backend, session.state(), "python"));

        let list = search.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().entry.title(), "Python Basics");
        assert!(list.iter().all(|book| book.is_member));
    }

    #[test]
    fn test_personal_search_failure_keeps_list() {
        let backend = FakeBackend::new().with_catalog(&[("Dune", "/works/OL1W")]);
        let mut session = SessionManager::new();
        session.login(&backend, "reader", "pass");
        let mut search = SearchCoordinator::new();
        search.search_catalog(&backend, &MembershipSet::default(), "");
        let before = search.list().clone();

        backend.fail_library.set(true);
        assert!(!search.search_personal_library(&backend, session.state(), ""));
        assert_eq!(search.list(), &before);
    }

    #[test]
    fn test_reflag_after_membership_change() {
        let backend = FakeBackend::new().with_catalog(&[("Dune", "/works/OL1W")]);
        let mut session = SessionManager::new();
        session.login(&backend, "reader", "pass");
        let mut tracker = MembershipTracker::new();
        let mut search = SearchCoordinator::new();
        search.search_catalog(&backend, tracker.set(), "dune");
        assert!(!search.list().get(0).unwrap().is_member);

        let entry = search.list().get(0).unwrap().entry.clone();
        assert!(tracker.add(&backend, session.state(), &entry));
        search.reflag(tracker.set());

        assert!(search.list().get(0).unwrap().is_member);
        assert_eq!(
            search.list().source(),
            &ListSource::Catalog {
                query: "dune".to_string()
            }
        );
    }
}
