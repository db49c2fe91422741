//! Standards text extraction
//!
//! Turns uploaded PDFs into one text blob for the prompt. Each document is
//! read page by page in page-number order; documents are joined with a single
//! space in upload order. One bad document aborts the whole batch.

use std::panic;

use lopdf::Document;
use shared_types::UploadedDocument;
use tracing::{debug, info, warn};

use crate::error::ExtractError;

/// How far into the payload the `%PDF-` marker may appear
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Source of per-page text for a page-oriented document
pub trait PageTextBackend {
    /// Backend identifier
    fn name(&self) -> &'static str;

    /// Extract the text of every page, in page order
    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, String>;
}

/// pdf-extract backend. Decodes simple and composite (Type0) fonts through
/// their encodings and `/ToUnicode` maps.
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTextBackend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, String> {
        if header_offset(data).is_none() {
            return Err("missing %PDF header".to_string());
        }

        // pdf-extract panics on some malformed documents instead of erroring
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data)) {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => {
                warn!("pdf-extract panicked on a malformed document");
                Err("malformed PDF structure".to_string())
            }
        }
    }
}

/// Position of the `%PDF-` marker within the first [`HEADER_SEARCH_WINDOW`] bytes
fn header_offset(data: &[u8]) -> Option<usize> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).position(|w| w == b"%PDF-")
}

/// Extract the text of a single PDF (all pages concatenated)
pub fn extract_document_text(data: &[u8]) -> Result<String, ExtractError> {
    document_text(&PdfExtractBackend::new(), "document", data)
}

/// Count pages in a PDF
pub fn page_count(data: &[u8]) -> Result<usize, ExtractError> {
    let doc = Document::load_mem(data).map_err(|e| ExtractError::decode("document", e.to_string()))?;
    Ok(doc.get_pages().len())
}

/// Extract and join the text of every uploaded document
pub fn extract_standards_text(documents: &[UploadedDocument]) -> Result<String, ExtractError> {
    extract_standards_text_with(&PdfExtractBackend::new(), documents)
}

/// Same as [`extract_standards_text`] with an explicit backend
pub fn extract_standards_text_with<B: PageTextBackend + ?Sized>(
    backend: &B,
    documents: &[UploadedDocument],
) -> Result<String, ExtractError> {
    let mut texts = Vec::with_capacity(documents.len());

    for document in documents {
        texts.push(document_text(backend, &document.filename, &document.bytes)?);
    }

    let joined = texts.join(" ");
    info!(
        "Extracted {} characters from {} document(s) using {}",
        joined.len(),
        documents.len(),
        backend.name()
    );

    Ok(joined)
}

fn document_text<B: PageTextBackend + ?Sized>(
    backend: &B,
    filename: &str,
    data: &[u8],
) -> Result<String, ExtractError> {
    let pages = backend
        .extract_pages(data)
        .map_err(|reason| ExtractError::decode(filename, reason))?;

    debug!("'{}': {} page(s)", filename, pages.len());

    Ok(pages.concat())
}
