//! DocuFlow - Thai document OCR and structured data extraction.
//!
//! Sends document images to the Mistral OCR API, cleans up the returned
//! Markdown and pulls out the fields Thai invoices carry: company name,
//! taxpayer ID, phone numbers, amounts, dates and addresses.

pub mod cli;
pub mod config;
pub mod models;
pub mod ocr;
pub mod rate_limit;
pub mod server;
pub mod services;
pub mod utils;
