//! Application state and logic

use shelf_core::{AuthOutcome, Backend, DisplayedBook, FocusPoint, LibraryContext, ListSource};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing a search query
    Search,
    /// Login popup is open
    Login,
}

/// Where a submitted search goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Catalog,
    Library,
}

/// Field of the login popup being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

impl LoginField {
    pub fn other(self) -> Self {
        match self {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        }
    }
}

/// Login popup contents
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub field: LoginField,
    /// Shown inside the popup after a failed attempt
    pub error: Option<String>,
}

impl LoginForm {
    fn active_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

/// Application state
pub struct App<B: Backend> {
    pub ctx: LibraryContext<B>,
    /// Whether the app should exit
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub search_target: SearchTarget,
    /// Search box contents
    pub search_input: String,
    /// Cursor position in the search box, in characters
    pub search_cursor: usize,
    /// Key of the focused book (empty for a keyless one), `None` while
    /// focus is outside the list
    pub focused_key: Option<String>,
    /// Position the focused book had when it was focused
    pub focused_at: usize,
    pub login_form: LoginForm,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<std::time::Instant>,
    /// Shown in the status bar while a blocking call runs
    pub busy: Option<&'static str>,
    /// Whether help overlay is visible
    pub show_help: bool,
}

impl<B: Backend> App<B> {
    pub fn new(ctx: LibraryContext<B>) -> Self {
        Self {
            ctx,
            should_quit: false,
            input_mode: InputMode::Normal,
            search_target: SearchTarget::Catalog,
            search_input: String::new(),
            search_cursor: 0,
            focused_key: None,
            focused_at: 0,
            login_form: LoginForm::default(),
            status_message: None,
            status_message_time: None,
            busy: None,
            show_help: false,
        }
    }

    /// Try the saved login once at startup
    pub fn start(&mut self) {
        match self.ctx.auto_login() {
            Some(AuthOutcome::Success { username, .. }) => {
                self.set_status(format!(
                    "Logged in as {} ({} book(s) in library)",
                    username,
                    self.ctx.membership().len()
                ));
            }
            Some(AuthOutcome::Failure) => {
                self.set_status("Saved login was not accepted. Press L to log in.");
            }
            None => {}
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(std::time::Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > std::time::Duration::from_secs(4) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Position of the focused book in the current list
    pub fn focused_index(&self) -> Option<usize> {
        let key = self.focused_key.as_deref()?;
        FocusPoint::new(key, self.focused_at).resolve(self.ctx.books())
    }

    pub fn focused_book(&self) -> Option<&DisplayedBook> {
        self.ctx.books().get(self.focused_index()?)
    }

    pub fn focus_next(&mut self) {
        let current = self.focused_key.take();
        let point = current
            .as_deref()
            .map(|key| FocusPoint::new(key, self.focused_at));
        let target = self.ctx.focus_next(point);
        self.focus_index(target);
    }

    pub fn focus_previous(&mut self) {
        let current = self.focused_key.take();
        let point = current
            .as_deref()
            .map(|key| FocusPoint::new(key, self.focused_at));
        let target = self.ctx.focus_previous(point);
        self.focus_index(target);
    }

    /// Move focus out of the list, back to the search box
    pub fn leave_list(&mut self) {
        self.focused_key = None;
    }

    fn focus_index(&mut self, index: Option<usize>) {
        self.focused_key = None;
        let Some(index) = index else {
            return;
        };
        if let Some(book) = self.ctx.books().get(index) {
            self.focused_key = Some(book.entry.key().to_string());
            self.focused_at = index;
        }
    }

    /// Add or remove the focused book
    pub fn toggle_focused(&mut self) {
        let Some(index) = self.focused_index() else {
            return;
        };
        if !self.ctx.session().is_authenticated() {
            self.set_status("Log in (L) to manage your library");
            return;
        }

        let (title, was_member) = match self.ctx.books().get(index) {
            Some(book) => (book.entry.title().to_string(), book.is_member),
            None => return,
        };
        match self.ctx.toggle_membership(index) {
            Some(true) if was_member => self.set_status(format!("Removed '{}'", title)),
            Some(true) => self.set_status(format!("Added '{}'", title)),
            _ => self.set_status(format!("Could not update library for '{}'", title)),
        }
    }

    pub fn enter_search_mode(&mut self, target: SearchTarget) {
        if target == SearchTarget::Library && !self.ctx.session().is_authenticated() {
            self.set_status("Log in (L) to search your library");
            return;
        }
        self.input_mode = InputMode::Search;
        self.search_target = target;
        self.search_input.clear();
        self.search_cursor = 0;
        self.leave_list();
    }

    /// Run the typed search and return to normal mode
    pub fn submit_search(&mut self) {
        let query = self.search_input.trim().to_string();
        let found = match self.search_target {
            SearchTarget::Catalog => self.ctx.search_catalog(&query),
            SearchTarget::Library => self.ctx.search_personal_library(&query),
        };
        self.input_mode = InputMode::Normal;

        if found {
            self.set_status(format!("{} book(s) found", self.ctx.books().len()));
        } else {
            self.set_status("Search failed. Check your connection and try again.");
        }
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.login_form = LoginForm::default();
    }

    /// Insert a character in the search box or the active login field
    pub fn insert_char(&mut self, c: char) {
        match self.input_mode {
            InputMode::Search => {
                let at = byte_offset(&self.search_input, self.search_cursor);
                self.search_input.insert(at, c);
                self.search_cursor += 1;
            }
            InputMode::Login => self.login_form.active_mut().push(c),
            InputMode::Normal => {}
        }
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        match self.input_mode {
            InputMode::Search => {
                if self.search_cursor > 0 {
                    self.search_cursor -= 1;
                    let at = byte_offset(&self.search_input, self.search_cursor);
                    self.search_input.remove(at);
                }
            }
            InputMode::Login => {
                self.login_form.active_mut().pop();
            }
            InputMode::Normal => {}
        }
    }

    pub fn cursor_left(&mut self) {
        self.search_cursor = self.search_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.search_cursor < self.search_input.chars().count() {
            self.search_cursor += 1;
        }
    }

    pub fn open_login(&mut self) {
        if let Some(username) = self.ctx.session().username() {
            let message = format!("Already logged in as {}. Press O to log out.", username);
            self.set_status(message);
            return;
        }
        self.login_form = LoginForm::default();
        self.input_mode = InputMode::Login;
    }

    pub fn switch_login_field(&mut self) {
        self.login_form.field = self.login_form.field.other();
    }

    /// Log in, or register when `register` is set, with the popup contents
    pub fn submit_login(&mut self, register: bool) {
        let username = self.login_form.username.trim().to_string();
        let password = self.login_form.password.clone();
        if username.is_empty() || password.is_empty() {
            self.login_form.error = Some("Enter a username and password".to_string());
            return;
        }

        let outcome = if register {
            self.ctx.register(&username, &password)
        } else {
            self.ctx.login(&username, &password)
        };

        match outcome {
            AuthOutcome::Success { message, .. } => {
                self.exit_input_mode();
                let greeting = match message {
                    Some(message) => format!("Logged in as {}: {}", username, message),
                    None => format!("Logged in as {}", username),
                };
                self.set_status(greeting);
            }
            AuthOutcome::Failure => {
                let action = if register { "Registration" } else { "Login" };
                self.login_form.error = Some(format!("{} failed", action));
                self.login_form.password.clear();
                self.login_form.field = LoginField::Password;
            }
        }
    }

    pub fn logout(&mut self) {
        if !self.ctx.session().is_authenticated() {
            self.set_status("Not logged in");
            return;
        }
        self.ctx.logout();
        if self.focused_index().is_none() {
            self.leave_list();
        }
        self.set_status("Logged out");
    }

    /// Title of the book list pane
    pub fn list_title(&self) -> String {
        let books = self.ctx.books();
        match books.source() {
            ListSource::Empty => " Books ".to_string(),
            ListSource::Catalog { query } => {
                format!(" Catalog: \"{}\" ({}) ", query, books.len())
            }
            ListSource::Library { query } if query.is_empty() => {
                format!(" My library ({}) ", books.len())
            }
            ListSource::Library { query } => {
                format!(" My library: \"{}\" ({}) ", query, books.len())
            }
        }
    }
}

/// Byte index of the `chars`-th character
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::testing::FakeBackend;

    fn app(backend: &FakeBackend) -> App<&FakeBackend> {
        App::new(LibraryContext::new(backend))
    }

    fn logged_in(backend: &FakeBackend) -> App<&FakeBackend> {
        let mut app = app(backend);
        app.open_login();
        "reader".chars().for_each(|c| app.insert_char(c));
        app.switch_login_field();
        "secret".chars().for_each(|c| app.insert_char(c));
        app.submit_login(false);
        app
    }

    fn search(app: &mut App<&FakeBackend>, target: SearchTarget, query: &str) {
        app.enter_search_mode(target);
        query.chars().for_each(|c| app.insert_char(c));
        app.submit_search();
    }

    #[test]
    fn test_login_field_other() {
        assert_eq!(LoginField::Username.other(), LoginField::Password);
        assert_eq!(LoginField::Password.other(), LoginField::Username);
    }

    #[test]
    fn test_catalog_search_as_guest() {
        let backend = FakeBackend::new().with_catalog(&[("Title a", "a"), ("Title b", "b")]);
        let mut app = app(&backend);

        search(&mut app, SearchTarget::Catalog, "Title");

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.ctx.books().len(), 2);
        assert_eq!(app.focused_key, None);
        assert_eq!(app.list_title(), " Catalog: \"Title\" (2) ");
    }

    #[test]
    fn test_library_search_requires_login() {
        let backend = FakeBackend::new();
        let mut app = app(&backend);

        app.enter_search_mode(SearchTarget::Library);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(backend.network_calls(), 0);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_focus_moves_by_key() {
        let backend = FakeBackend::new().with_catalog(&[
            ("Title a", "a"),
            ("Title b", "b"),
            ("Title c", "c"),
        ]);
        let mut app = app(&backend);
        search(&mut app, SearchTarget::Catalog, "");

        app.focus_next();
        assert_eq!(app.focused_key.as_deref(), Some("a"));
        app.focus_previous();
        assert_eq!(app.focused_key.as_deref(), Some("c"));

        app.leave_list();
        app.focus_next();
        assert_eq!(app.focused_key.as_deref(), Some("c"));
    }

    #[test]
    fn test_focus_walks_past_keyless_book() {
        let backend =
            FakeBackend::new().with_catalog(&[("Title a", "a"), ("Untitled", ""), ("Title c", "c")]);
        let mut app = app(&backend);
        search(&mut app, SearchTarget::Catalog, "");

        let mut visited = Vec::new();
        for _ in 0..6 {
            app.focus_next();
            visited.push(app.focused_index());
        }
        assert_eq!(
            visited,
            vec![Some(0), Some(1), Some(2), Some(0), Some(1), Some(2)]
        );

        app.focus_previous();
        assert_eq!(app.focused_index(), Some(1));
        assert_eq!(app.focused_book().unwrap().entry.title(), "Untitled");
        app.focus_previous();
        assert_eq!(app.focused_key.as_deref(), Some("a"));
    }

    #[test]
    fn test_focus_on_empty_list() {
        let backend = FakeBackend::new();
        let mut app = app(&backend);

        app.focus_next();
        assert_eq!(app.focused_key, None);
        assert_eq!(app.focused_index(), None);
    }

    #[test]
    fn test_toggle_as_guest() {
        let backend = FakeBackend::new().with_catalog(&[("Title a", "a")]);
        let mut app = app(&backend);
        search(&mut app, SearchTarget::Catalog, "");
        app.focus_next();
        let calls = backend.network_calls();

        app.toggle_focused();

        assert_eq!(backend.network_calls(), calls);
        assert!(!app.focused_book().unwrap().is_member);
    }

    #[test]
    fn test_toggle_keeps_focus() {
        let backend = FakeBackend::new().with_catalog(&[("Title a", "a"), ("Title b", "b")]);
        let mut app = logged_in(&backend);
        search(&mut app, SearchTarget::Catalog, "");
        app.focus_next();
        app.focus_next();

        app.toggle_focused();
        assert!(backend.owns("b"));
        assert_eq!(app.focused_index(), Some(1));
        assert!(app.focused_book().unwrap().is_member);
        assert_eq!(app.status_message.as_deref(), Some("Added 'Title b'"));

        app.toggle_focused();
        assert!(!backend.owns("b"));
        assert!(!app.focused_book().unwrap().is_member);
    }

    #[test]
    fn test_failed_login_keeps_popup_open() {
        let backend = FakeBackend::new();
        backend.accept_login.set(false);
        let mut app = app(&backend);
        app.open_login();
        "reader".chars().for_each(|c| app.insert_char(c));
        app.switch_login_field();
        "nope".chars().for_each(|c| app.insert_char(c));

        app.submit_login(false);

        assert_eq!(app.input_mode, InputMode::Login);
        assert_eq!(app.login_form.error.as_deref(), Some("Login failed"));
        assert!(app.login_form.password.is_empty());
        assert!(!app.ctx.session().is_authenticated());
    }

    #[test]
    fn test_empty_login_form_makes_no_call() {
        let backend = FakeBackend::new();
        let mut app = app(&backend);
        app.open_login();

        app.submit_login(true);

        assert_eq!(backend.network_calls(), 0);
        assert!(app.login_form.error.is_some());
    }

    #[test]
    fn test_login_then_logout() {
        let backend = FakeBackend::new();
        let mut app = logged_in(&backend);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.ctx.session().username(), Some("reader"));

        app.open_login();
        assert_eq!(app.input_mode, InputMode::Normal);

        app.logout();
        assert!(!app.ctx.session().is_authenticated());
        assert_eq!(app.status_message.as_deref(), Some("Logged out"));
    }

    #[test]
    fn test_search_input_editing() {
        let backend = FakeBackend::new();
        let mut app = app(&backend);
        app.enter_search_mode(SearchTarget::Catalog);

        "über".chars().for_each(|c| app.insert_char(c));
        app.cursor_left();
        app.cursor_left();
        app.insert_char('X');
        assert_eq!(app.search_input, "übXer");

        app.delete_char();
        app.cursor_right();
        app.cursor_right();
        app.cursor_right();
        app.delete_char();
        assert_eq!(app.search_input, "übe");
        assert_eq!(app.search_cursor, 3);
    }
}
