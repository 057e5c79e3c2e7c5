//! OCR client layer.
//!
//! The `OcrBackend` trait abstracts the remote OCR service so the processing
//! pipeline and web server can be exercised without network access. The
//! production implementation is `MistralBackend`.

mod backend;
mod mistral;

pub use backend::{ImageInput, OcrBackend, OcrError};
pub use mistral::MistralBackend;

#[cfg(test)]
pub(crate) mod testing;
