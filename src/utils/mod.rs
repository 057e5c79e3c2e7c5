//! Shared utility functions.
//!
//! - `format`: human-readable formatting (sizes)
//! - `mime`: image format detection for uploads

mod format;
mod mime;

pub use format::format_size;
pub use mime::{is_supported_extension, ImageFormat, SUPPORTED_EXTENSIONS};
