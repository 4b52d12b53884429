//! Wiki2vid Core Library
//!
//! Client side of wiki2vid: validates Wikipedia article URLs, talks to the
//! video-generation backend, and keeps the form state a UI renders.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod validate;

// Re-export commonly used items at crate root
pub use api::{HttpBackend, VideoBackend, default_download_dir, extract_field};
pub use config::ApiConfig;
pub use controller::{
    Completion, FormController, FormState, Notice, NoticeLevel, RequestTicket, format_status,
};
pub use error::{Result, Wiki2VidError};
pub use validate::{WikiArticle, is_valid_url, parse_article};
