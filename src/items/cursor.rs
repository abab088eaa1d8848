/// Where the selection sits within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// The collection is empty.
    #[default]
    Empty,
    /// Index of the selected item.
    Positioned(usize),
}

/// Selection within a collection, plus the scroll offset that keeps it on
/// screen.
///
/// The cursor never reads or mutates items; callers learn which index was
/// left from the return values and commit it themselves.
#[derive(Debug, Default)]
pub struct Cursor {
    state: CursorState,
    scroll_offset: usize,
    viewport_rows: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self.state {
            CursorState::Empty => None,
            CursorState::Positioned(index) => Some(index),
        }
    }

    /// First visible row.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Rebind to a collection of `len` items: head if non-empty, else Empty.
    pub fn reset(&mut self, len: usize) {
        self.state = if len > 0 {
            CursorState::Positioned(0)
        } else {
            CursorState::Empty
        };
        self.scroll_offset = 0;
    }

    /// Advance by one. Returns the index that was left, or `None` at the tail
    /// or when empty.
    pub fn advance(&mut self, len: usize) -> Option<usize> {
        match self.state {
            CursorState::Positioned(index) if index + 1 < len => {
                self.state = CursorState::Positioned(index + 1);
                self.reveal();
                Some(index)
            }
            _ => None,
        }
    }

    /// Step back by one. Returns `false` at the head or when empty.
    pub fn retreat(&mut self) -> bool {
        match self.state {
            CursorState::Positioned(index) if index > 0 => {
                self.state = CursorState::Positioned(index - 1);
                self.reveal();
                true
            }
            _ => false,
        }
    }

    /// Record the list height from the last render and scroll to keep the
    /// selection visible.
    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows;
        self.reveal();
    }

    /// Scroll the minimum amount that brings the selection fully into view.
    fn reveal(&mut self) {
        let Some(index) = self.selected_index() else {
            self.scroll_offset = 0;
            return;
        };
        if self.viewport_rows == 0 {
            return;
        }
        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if index >= self.scroll_offset + self.viewport_rows {
            self.scroll_offset = index + 1 - self.viewport_rows;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reset_positions_at_head() {
        let mut cursor = Cursor::new();
        assert_eq!(cursor.state(), CursorState::Empty);

        cursor.reset(3);
        assert_eq!(cursor.state(), CursorState::Positioned(0));

        cursor.reset(0);
        assert_eq!(cursor.state(), CursorState::Empty);
    }

    #[test]
    fn test_advance_reports_left_index_and_clamps() {
        let mut cursor = Cursor::new();
        cursor.reset(2);

        assert_eq!(cursor.advance(2), Some(0));
        assert_eq!(cursor.selected_index(), Some(1));

        // Tail: stays put
        assert_eq!(cursor.advance(2), None);
        assert_eq!(cursor.selected_index(), Some(1));
    }

    #[test]
    fn test_retreat_clamps_at_head() {
        let mut cursor = Cursor::new();
        cursor.reset(2);
        assert!(!cursor.retreat());
        assert_eq!(cursor.selected_index(), Some(0));

        cursor.advance(2);
        assert!(cursor.retreat());
        assert_eq!(cursor.selected_index(), Some(0));
    }

    #[test]
    fn test_empty_cursor_ignores_movement() {
        let mut cursor = Cursor::new();
        cursor.reset(0);
        assert_eq!(cursor.advance(0), None);
        assert!(!cursor.retreat());
        assert_eq!(cursor.state(), CursorState::Empty);
    }

    #[test]
    fn test_scrolls_down_to_reveal_selection() {
        let mut cursor = Cursor::new();
        cursor.reset(10);
        cursor.set_viewport_rows(3);

        cursor.advance(10);
        cursor.advance(10);
        assert_eq!(cursor.scroll_offset(), 0);

        cursor.advance(10);
        assert_eq!(cursor.selected_index(), Some(3));
        assert_eq!(cursor.scroll_offset(), 1);
    }

    #[test]
    fn test_scrolls_up_to_reveal_selection() {
        let mut cursor = Cursor::new();
        cursor.reset(10);
        cursor.set_viewport_rows(3);
        for _ in 0..5 {
            cursor.advance(10);
        }
        assert_eq!(cursor.scroll_offset(), 3);

        cursor.retreat();
        cursor.retreat();
        assert_eq!(cursor.scroll_offset(), 3);
        cursor.retreat();
        assert_eq!(cursor.selected_index(), Some(2));
        assert_eq!(cursor.scroll_offset(), 2);
    }

    #[test]
    fn test_shrinking_viewport_keeps_selection_visible() {
        let mut cursor = Cursor::new();
        cursor.reset(10);
        cursor.set_viewport_rows(8);
        for _ in 0..6 {
            cursor.advance(10);
        }
        assert_eq!(cursor.scroll_offset(), 0);

        cursor.set_viewport_rows(2);
        assert_eq!(cursor.scroll_offset(), 5);
    }

    #[derive(Debug, Clone)]
    enum Move {
        Next,
        Previous,
    }

    fn moves() -> impl Strategy<Value = Vec<Move>> {
        prop::collection::vec(prop_oneof![Just(Move::Next), Just(Move::Previous)], 0..64)
    }

    proptest! {
        #[test]
        fn prop_selection_stays_in_bounds(len in 0usize..20, rows in 1usize..10, moves in moves()) {
            let mut cursor = Cursor::new();
            cursor.reset(len);
            cursor.set_viewport_rows(rows);

            for m in moves {
                match m {
                    Move::Next => { cursor.advance(len); }
                    Move::Previous => { cursor.retreat(); }
                }
                match cursor.state() {
                    CursorState::Empty => prop_assert_eq!(len, 0),
                    CursorState::Positioned(index) => {
                        prop_assert!(index < len);
                        prop_assert!(index >= cursor.scroll_offset());
                        prop_assert!(index < cursor.scroll_offset() + rows);
                    }
                }
            }
        }

        #[test]
        fn prop_advance_leaves_previous_index(len in 1usize..20, steps in 0usize..40) {
            let mut cursor = Cursor::new();
            cursor.reset(len);
            for _ in 0..steps {
                let before = cursor.selected_index();
                match cursor.advance(len) {
                    Some(left) => {
                        prop_assert_eq!(Some(left), before);
                        prop_assert_eq!(cursor.selected_index(), Some(left + 1));
                    }
                    None => prop_assert_eq!(cursor.selected_index(), Some(len - 1)),
                }
            }
        }
    }
}
