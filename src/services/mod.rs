//! Service layer for DocuFlow business logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Services are shared by the CLI and the web server.

pub mod export;
pub mod extraction;
pub mod postprocess;
pub mod processor;

pub use export::{ExportError, ExportFormat};
pub use extraction::{display_fields, extract_fields, is_valid_tax_id};
pub use postprocess::{PostProcessor, PostProcessorChain};
pub use processor::{BatchOutcome, DocumentProcessor};
