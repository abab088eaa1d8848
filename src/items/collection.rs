use super::item::Item;
use crate::api::{ItemId, ItemRecord};
use std::collections::HashSet;
use tokio::sync::watch;

/// Which server queue a collection mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Unread,
    Archived,
}

impl CollectionKind {
    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Unread => "Unread",
            CollectionKind::Archived => "Archive",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            CollectionKind::Unread => CollectionKind::Archived,
            CollectionKind::Archived => CollectionKind::Unread,
        }
    }
}

/// Change notifications for one collection.
///
/// Carries the collection's version number. Dropping the receiver is the
/// unsubscribe.
pub type Subscription = watch::Receiver<u64>;

/// Ordered snapshot of items from one server queue.
///
/// The item list is only ever replaced wholesale; every replacement or local
/// read-flag sweep bumps `version` and notifies subscribers exactly once.
#[derive(Debug)]
pub struct ItemCollection {
    kind: CollectionKind,
    items: Vec<Item>,
    version: u64,
    changes: watch::Sender<u64>,
}

impl ItemCollection {
    pub fn new(kind: CollectionKind) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            kind,
            items: Vec::new(),
            version: 0,
            changes,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of changes published so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_read()).count()
    }

    /// Register for change notifications.
    pub fn subscribe(&self) -> Subscription {
        self.changes.subscribe()
    }

    /// Swap in a freshly fetched snapshot and notify.
    ///
    /// Server order is preserved. A repeated id keeps its first occurrence.
    /// Archived items are always materialized as read.
    pub fn replace(&mut self, records: Vec<ItemRecord>) {
        let mut seen = HashSet::with_capacity(records.len());
        let mut items = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.id) {
                tracing::warn!(item_id = record.id, kind = ?self.kind, "Dropping duplicate item from server");
                continue;
            }
            items.push(match self.kind {
                CollectionKind::Unread => Item::from_record(record),
                CollectionKind::Archived => Item::archived(record),
            });
        }

        tracing::debug!(kind = ?self.kind, count = items.len(), "Collection replaced");
        self.items = items;
        self.publish();
    }

    /// Flip the read flag on the given ids without issuing requests and
    /// notify. Used once the server acknowledged a bulk mark.
    pub fn assume_read(&mut self, ids: &[ItemId]) {
        let ids: HashSet<ItemId> = ids.iter().copied().collect();
        for item in self.items.iter_mut().filter(|item| ids.contains(&item.id)) {
            item.assume_read();
        }
        self.publish();
    }

    fn publish(&mut self) {
        self.version += 1;
        // send_replace stores the value even with no live receivers
        self.changes.send_replace(self.version);
    }
}
