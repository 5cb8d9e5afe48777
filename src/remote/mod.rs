//! Remote sharing API: upload, delete and share links.

pub mod client;
pub mod sanitize;

pub use client::{RemoteClient, server_error_message, share_url};
pub use sanitize::sanitize_images;
