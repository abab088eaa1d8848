//! tpr: terminal client for a personal feed reader.
//!
//! The interesting state lives in [`items`]: an ordered unread queue, a single
//! selection cursor, commit-on-deselect read semantics, and the bulk
//! mark-all-read / re-fetch cycle. Everything else is the shell around it:
//!
//! - [`api`] - the reader server's HTTP API (`ItemsApi` trait + `reqwest` client)
//! - [`session`] - the persisted login session threaded into the API client
//! - [`config`] - `~/.config/tpr/config.toml`
//! - [`keybindings`] - key → action registry, per mounted view
//! - [`app`] / [`ui`] - application state and the terminal event loop

pub mod api;
pub mod app;
pub mod config;
pub mod items;
pub mod keybindings;
pub mod session;
pub mod ui;
pub mod util;
