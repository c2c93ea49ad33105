//! Cyclic focus navigation over the displayed list
//!
//! Focus is tracked by book key rather than position, because the list
//! is rebuilt wholesale and positions do not survive a rebuild. The last
//! known position is kept next to the key for entries without one.

use crate::models::{BookEntry, DisplayedBookList};

/// Where focus currently sits: the focused entry's key and the position
/// it had when it was focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusPoint<'a> {
    pub key: &'a str,
    pub index: usize,
}

impl<'a> FocusPoint<'a> {
    pub fn new(key: &'a str, index: usize) -> Self {
        Self { key, index }
    }

    /// Position of the focused entry in `list`
    ///
    /// The recorded index wins while it still holds an entry with the same
    /// key, which also covers keyless entries. Otherwise the entry is looked
    /// up by key; a keyless entry that moved cannot be found again.
    pub fn resolve(&self, list: &DisplayedBookList) -> Option<usize> {
        if list
            .get(self.index)
            .is_some_and(|book| book.entry.key() == self.key)
        {
            return Some(self.index);
        }
        if self.key.is_empty() {
            return None;
        }
        list.position_of_key(self.key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusNavigator {
    last_focused_key: Option<String>,
}

impl FocusNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_focused_key(&self) -> Option<&str> {
        self.last_focused_key.as_deref()
    }

    /// Record that an entry received focus
    pub fn on_focus(&mut self, entry: &BookEntry) {
        self.last_focused_key = entry.has_key().then(|| entry.key().to_string());
    }

    /// Index of the entry after the focused one, wrapping
    ///
    /// `current` is the focused entry, or `None` when focus is outside the
    /// list. Returns `None` only for an empty list.
    pub fn focus_next(
        &mut self,
        list: &DisplayedBookList,
        current: Option<FocusPoint<'_>>,
    ) -> Option<usize> {
        self.step(list, current, Direction::Forward)
    }

    /// Index of the entry before the focused one, wrapping
    pub fn focus_previous(
        &mut self,
        list: &DisplayedBookList,
        current: Option<FocusPoint<'_>>,
    ) -> Option<usize> {
        self.step(list, current, Direction::Backward)
    }

    fn step(
        &mut self,
        list: &DisplayedBookList,
        current: Option<FocusPoint<'_>>,
        direction: Direction,
    ) -> Option<usize> {
        let len = list.len();
        if len == 0 {
            return None;
        }

        let target = match current.and_then(|point| point.resolve(list)) {
            Some(index) => match direction {
                Direction::Forward => (index + 1) % len,
                Direction::Backward => (index + len - 1) % len,
            },
            // Entering the list: resume where we left off if that entry survived
            None => self
                .last_focused_key
                .as_deref()
                .and_then(|key| list.position_of_key(key))
                .unwrap_or(0),
        };

        if let Some(book) = list.get(target) {
            self.on_focus(&book.entry);
        }
        Some(target)
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DisplayedBook, ListSource};
    use crate::normalize::normalize;
    use crate::wire::{CatalogDoc, RawBook};

    fn list(keys: &[&str]) -> DisplayedBookList {
        let books = keys
            .iter()
            .map(|key| DisplayedBook {
                entry: normalize(RawBook::Catalog(CatalogDoc {
                    title: Some(key.to_uppercase()),
                    key: Some(key.to_string()),
                    ..CatalogDoc::default()
                })),
                is_member: false,
            })
            .collect();
        DisplayedBookList::new(ListSource::Empty, books)
    }

    fn key_at(list: &DisplayedBookList, index: usize) -> &str {
        list.get(index).unwrap().entry.key()
    }

    fn at(list: &DisplayedBookList, index: usize) -> Option<FocusPoint<'_>> {
        Some(FocusPoint::new(key_at(list, index), index))
    }

    #[test]
    fn test_empty_list_is_noop() {
        let mut focus = FocusNavigator::new();
        let empty = list(&[]);

        assert_eq!(focus.focus_next(&empty, None), None);
        assert_eq!(focus.focus_previous(&empty, Some(FocusPoint::new("a", 0))), None);
        assert_eq!(focus.last_focused_key(), None);
    }

    #[test]
    fn test_next_advances_from_current() {
        let mut focus = FocusNavigator::new();
        let books = list(&["a", "b", "c"]);

        assert_eq!(focus.focus_next(&books, at(&books, 1)), Some(2));
        assert_eq!(focus.last_focused_key(), Some("c"));
    }

    #[test]
    fn test_previous_wraps_around() {
        let mut focus = FocusNavigator::new();
        let books = list(&["a", "b", "c"]);

        assert_eq!(focus.focus_previous(&books, at(&books, 0)), Some(2));
        assert_eq!(focus.focus_next(&books, at(&books, 2)), Some(0));
    }

    #[test]
    fn test_cycle_returns_to_start() {
        let books = list(&["a", "b", "c", "d", "e"]);

        for start in 0..books.len() {
            let mut focus = FocusNavigator::new();
            let mut current = start;
            for _ in 0..books.len() {
                current = focus.focus_next(&books, at(&books, current)).unwrap();
            }
            assert_eq!(current, start);

            for _ in 0..books.len() {
                current = focus.focus_previous(&books, at(&books, current)).unwrap();
            }
            assert_eq!(current, start);
        }
    }

    #[test]
    fn test_single_entry_stays_put() {
        let mut focus = FocusNavigator::new();
        let books = list(&["only"]);

        assert_eq!(focus.focus_next(&books, at(&books, 0)), Some(0));
        assert_eq!(focus.focus_previous(&books, at(&books, 0)), Some(0));
    }

    #[test]
    fn test_outside_focus_resumes_last_focused() {
        let mut focus = FocusNavigator::new();
        let books = list(&["a", "b", "c"]);
        focus.on_focus(&books.get(1).unwrap().entry);

        assert_eq!(focus.focus_next(&books, None), Some(1));
        assert_eq!(focus.focus_previous(&books, None), Some(1));
    }

    #[test]
    fn test_outside_focus_without_history_goes_first() {
        let mut focus = FocusNavigator::new();
        let books = list(&["a", "b"]);

        assert_eq!(focus.focus_next(&books, None), Some(0));
    }

    #[test]
    fn test_last_focused_survives_rebuild() {
        let mut focus = FocusNavigator::new();
        let before = list(&["a", "b", "c"]);
        focus.on_focus(&before.get(2).unwrap().entry);

        // Same book, new position
        let after = list(&["x", "c", "y"]);
        assert_eq!(focus.focus_next(&after, None), Some(1));
    }

    #[test]
    fn test_stale_last_focused_falls_back_to_first() {
        let mut focus = FocusNavigator::new();
        let before = list(&["a", "b"]);
        focus.on_focus(&before.get(1).unwrap().entry);

        let after = list(&["x", "y"]);
        assert_eq!(focus.focus_next(&after, None), Some(0));
        assert_eq!(focus.last_focused_key(), Some("x"));
    }

    #[test]
    fn test_unknown_current_key_treated_as_outside() {
        let mut focus = FocusNavigator::new();
        let books = list(&["a", "b"]);

        assert_eq!(focus.focus_next(&books, Some(FocusPoint::new("gone", 7))), Some(0));
    }

    #[test]
    fn test_keyless_entry_keeps_its_place_in_the_cycle() {
        let mut focus = FocusNavigator::new();
        let books = list(&["a", "", "c"]);

        let mut current = 0;
        let mut visited = Vec::new();
        for _ in 0..6 {
            current = focus.focus_next(&books, at(&books, current)).unwrap();
            visited.push(current);
        }
        assert_eq!(visited, vec![1, 2, 0, 1, 2, 0]);

        let mut visited = Vec::new();
        for _ in 0..3 {
            current = focus.focus_previous(&books, at(&books, current)).unwrap();
            visited.push(current);
        }
        assert_eq!(visited, vec![2, 1, 0]);
    }

    #[test]
    fn test_point_prefers_recorded_index_for_duplicate_keys() {
        let books = list(&["a", "b", "a"]);

        assert_eq!(FocusPoint::new("a", 2).resolve(&books), Some(2));
        // Index no longer matches: fall back to the key
        assert_eq!(FocusPoint::new("b", 0).resolve(&books), Some(1));
    }

    #[test]
    fn test_moved_keyless_point_is_outside() {
        let books = list(&["a", "b"]);

        assert_eq!(FocusPoint::new("", 1).resolve(&books), None);
        assert_eq!(FocusPoint::new("", 5).resolve(&books), None);
    }
}
