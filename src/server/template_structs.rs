//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.

use askama::Template;

/// Main upload page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub model: &'a str,
    pub max_upload_mb: usize,
    /// Value for the file input's `accept` attribute.
    pub accept: String,
    pub backend_available: bool,
    pub availability_hint: String,
}
