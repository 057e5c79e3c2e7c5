//! Static asset constants (CSS and JavaScript).

/// Stylesheet for the web interface.
pub const CSS: &str = include_str!("styles.css");

/// JavaScript for uploads, result tabs and batch export.
pub const JS: &str = include_str!("app.js");
