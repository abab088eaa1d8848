//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `helpers` - Spawned fetch / bulk-mark requests
//! - `render` - Layout and title bar
//! - `item_list` - Item list widget
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod events;
mod help;
mod helpers;
mod input;
mod item_list;
mod loop_runner;
mod render;
mod status;

// Re-export the public API. The two handlers are the loop's dispatch steps,
// usable without a terminal.
pub use events::handle_app_event;
pub use input::handle_input;
pub use loop_runner::{run, Action};
