//! Shared PDF handling utilities
//!
//! This crate turns uploaded standards and regulation PDFs into the plain
//! text that is fed into the risk template prompt.

pub mod error;
pub mod extract;

pub use error::ExtractError;
pub use extract::{
    extract_document_text, extract_standards_text, extract_standards_text_with, page_count,
    PageTextBackend, PdfExtractBackend,
};
