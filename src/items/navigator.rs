use super::collection::{CollectionKind, ItemCollection, Subscription};
use super::cursor::Cursor;
use super::item::{Item, ReadMarker};
use crate::api::{ItemId, ItemRecord};
use std::sync::Arc;

/// A mounted collection view: the collection, its cursor, and the marker
/// that commits reads.
///
/// An item is committed as read when the cursor moves forward off it, when
/// it is opened, or when the collection changes while it is selected.
/// Moving backward never commits.
pub struct Navigator {
    collection: ItemCollection,
    cursor: Cursor,
    marker: Arc<dyn ReadMarker>,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("collection", &self.collection)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl Navigator {
    pub fn new(kind: CollectionKind, marker: Arc<dyn ReadMarker>) -> Self {
        Self {
            collection: ItemCollection::new(kind),
            cursor: Cursor::new(),
            marker,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.collection.kind()
    }

    pub fn collection(&self) -> &ItemCollection {
        &self.collection
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn subscribe(&self) -> Subscription {
        self.collection.subscribe()
    }

    pub fn selected(&self) -> Option<&Item> {
        self.cursor
            .selected_index()
            .and_then(|index| self.collection.items().get(index))
    }

    /// `j`: move down, committing the item being left.
    pub fn select_next(&mut self) -> bool {
        match self.cursor.advance(self.collection.len()) {
            Some(left) => {
                self.commit(left);
                true
            }
            None => false,
        }
    }

    /// `k`: move up. Never commits.
    pub fn select_previous(&mut self) -> bool {
        self.cursor.retreat()
    }

    /// `v`: commit the selected item and hand back its URL for the browser.
    pub fn view_selected(&mut self) -> Option<String> {
        let index = self.cursor.selected_index()?;
        self.commit(index);
        self.collection.items().get(index).map(|item| item.url.clone())
    }

    /// Ids to send with `Shift+a`. `None` for the archive, which has no bulk
    /// mark.
    pub fn bulk_mark_ids(&self) -> Option<Vec<ItemId>> {
        match self.kind() {
            CollectionKind::Unread => Some(self.collection.ids()),
            CollectionKind::Archived => None,
        }
    }

    /// Install a fetched snapshot.
    ///
    /// The item selected in the outgoing snapshot is committed first, then
    /// the cursor returns to the head of the new one.
    pub fn apply_fetched(&mut self, records: Vec<ItemRecord>) {
        if let Some(index) = self.cursor.selected_index() {
            self.commit(index);
        }
        self.collection.replace(records);
        self.cursor.reset(self.collection.len());
    }

    /// The server acknowledged a bulk mark for `ids`: flip them locally and
    /// return the cursor to the head. Issues no requests; a refetch should
    /// follow.
    pub fn apply_bulk_marked(&mut self, ids: &[ItemId]) {
        self.collection.assume_read(ids);
        if let Some(index) = self.cursor.selected_index() {
            self.commit(index);
        }
        self.cursor.reset(self.collection.len());
    }

    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.cursor.set_viewport_rows(rows);
    }

    fn commit(&mut self, index: usize) {
        if let Some(item) = self.collection.get_mut(index) {
            item.mark_read(self.marker.as_ref());
        }
    }
}
