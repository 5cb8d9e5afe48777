//! Offline export of a conversation to a standalone HTML page.

pub mod html;

pub use html::{export_filename, parse_export_entries, render_html};
