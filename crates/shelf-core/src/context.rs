//! Library context
//!
//! Holds the session, membership, displayed list and focus cursor, and
//! applies the control flow between them:
//!
//! - login, register and auto-login refresh membership on success
//! - searches rebuild the list against the current membership
//! - add and remove refresh membership, then rebuild the list flags
//!
//! Every operation is fail-soft; nothing here returns an error.

use tracing::warn;

use crate::credentials::{CredentialStore, SavedLogin};
use crate::focus::{FocusNavigator, FocusPoint};
use crate::gateway::Backend;
use crate::membership::{MembershipSet, MembershipTracker};
use crate::models::{BookEntry, DisplayedBookList, ListSource};
use crate::search::SearchCoordinator;
use crate::session::{AuthOutcome, SessionManager, SessionState};

/// Saved-login settings for a context
#[derive(Debug, Clone)]
struct SavedLogins {
    store: CredentialStore,
    remember: bool,
}

/// Explicit client state, passed to the UI instead of a global app object
pub struct LibraryContext<B: Backend> {
    backend: B,
    session: SessionManager,
    membership: MembershipTracker,
    search: SearchCoordinator,
    focus: FocusNavigator,
    saved_logins: Option<SavedLogins>,
}

impl<B: Backend> LibraryContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: SessionManager::new(),
            membership: MembershipTracker::new(),
            search: SearchCoordinator::new(),
            focus: FocusNavigator::new(),
            saved_logins: None,
        }
    }

    /// Use a credential store for auto-login
    ///
    /// When `remember` is set, successful interactive logins are saved.
    pub fn with_credential_store(mut self, store: CredentialStore, remember: bool) -> Self {
        self.saved_logins = Some(SavedLogins { store, remember });
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> &SessionState {
        self.session.state()
    }

    pub fn membership(&self) -> &MembershipSet {
        self.membership.set()
    }

    pub fn books(&self) -> &DisplayedBookList {
        self.search.list()
    }

    pub fn focus(&self) -> &FocusNavigator {
        &self.focus
    }

    pub fn login(&mut self, username: &str, password: &str) -> AuthOutcome {
        let outcome = self.session.login(&self.backend, username, password);
        self.after_auth(&outcome, Some((username, password)));
        outcome
    }

    pub fn register(&mut self, username: &str, password: &str) -> AuthOutcome {
        let outcome = self.session.register(&self.backend, username, password);
        self.after_auth(&outcome, Some((username, password)));
        outcome
    }

    /// Log in with the saved login, once per process
    pub fn auto_login(&mut self) -> Option<AuthOutcome> {
        let saved = self.load_saved_login();
        let outcome = self.session.auto_login(&self.backend, saved.as_ref())?;
        self.after_auth(&outcome, None);
        Some(outcome)
    }

    /// Return to guest, forgetting membership and the saved login
    pub fn logout(&mut self) {
        self.session.logout();
        self.membership.clear();
        if matches!(self.search.list().source(), ListSource::Library { .. }) {
            self.search.reset();
        } else {
            self.search.reflag(self.membership.set());
        }

        if let Some(saved) = &self.saved_logins {
            if let Err(e) = saved.store.clear() {
                warn!("Failed to forget saved login: {}", e);
            }
        }
    }

    pub fn search_catalog(&mut self, query: &str) -> bool {
        self.search
            .search_catalog(&self.backend, self.membership.set(), query)
    }

    pub fn search_personal_library(&mut self, query: &str) -> bool {
        self.search
            .search_personal_library(&self.backend, self.session.state(), query)
    }

    /// Re-fetch membership from the backend and reflag the list
    pub fn refresh_membership(&mut self) -> bool {
        let refreshed = self
            .membership
            .refresh_full(&self.backend, self.session.state());
        if refreshed {
            self.search.reflag(self.membership.set());
        }
        refreshed
    }

    pub fn add_book(&mut self, entry: &BookEntry) -> bool {
        let added = self
            .membership
            .add(&self.backend, self.session.state(), entry);
        if added {
            self.search.reflag(self.membership.set());
        }
        added
    }

    pub fn remove_book(&mut self, entry: &BookEntry) -> bool {
        let removed = self
            .membership
            .remove(&self.backend, self.session.state(), entry);
        if removed {
            self.search.reflag(self.membership.set());
        }
        removed
    }

    /// Add or remove the displayed book at `index` depending on its flag
    ///
    /// Returns `None` if there is no book at `index`.
    pub fn toggle_membership(&mut self, index: usize) -> Option<bool> {
        let book = self.search.list().get(index)?.clone();
        let changed = self.membership.toggle(
            &self.backend,
            self.session.state(),
            &book.entry,
            book.is_member,
        );
        if changed {
            self.search.reflag(self.membership.set());
        }
        Some(changed)
    }

    pub fn on_focus(&mut self, index: usize) {
        if let Some(book) = self.search.list().get(index) {
            self.focus.on_focus(&book.entry);
        }
    }

    pub fn focus_next(&mut self, current: Option<FocusPoint<'_>>) -> Option<usize> {
        self.focus.focus_next(self.search.list(), current)
    }

    pub fn focus_previous(&mut self, current: Option<FocusPoint<'_>>) -> Option<usize> {
        self.focus.focus_previous(self.search.list(), current)
    }

    fn after_auth(&mut self, outcome: &AuthOutcome, typed: Option<(&str, &str)>) {
        if !outcome.is_success() {
            return;
        }
        self.refresh_membership();

        // Only logins typed by the user are saved; auto-login reuses the file
        if let (Some((username, password)), Some(saved)) = (typed, &self.saved_logins) {
            if saved.remember {
                if let Err(e) = saved.store.save(&SavedLogin::new(username, password)) {
                    warn!("Failed to save login: {}", e);
                }
            }
        }
    }

    fn load_saved_login(&self) -> Option<SavedLogin> {
        let saved = self.saved_logins.as_ref()?;
        match saved.store.load() {
            Ok(login) => login,
            Err(e) => {
                warn!("Ignoring saved login: {}", e);
                None
            }
        }
    }
}
