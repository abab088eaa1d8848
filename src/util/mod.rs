//! Utility functions shared by the UI layer.
//!
//! - **URL validation**: what may be handed to the system browser
//! - **Text processing**: terminal-safe, width-aware title rendering

mod text;
mod url_validator;

pub use text::{display_width, format_relative_time, sanitize_line, truncate_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};
