//! Unread-item navigation: items, the collections that hold them, the cursor
//! that walks them, and the rules for when reads reach the server.

mod collection;
mod cursor;
mod item;
mod navigator;
pub mod sync;

pub use collection::{CollectionKind, ItemCollection, Subscription};
pub use cursor::{Cursor, CursorState};
pub use item::{Item, ReadMarker, SpawnedReadMarker};
pub use navigator::Navigator;
