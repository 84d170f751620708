use lopdf::Document;
use thiserror::Error;
use tracing::{debug, warn};

/// Reasons a document could not be turned into text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("document could not be opened as a PDF: {0}")]
    Unreadable(String),
    #[error("document has no extractable text layer")]
    NoText,
}

/// Source of plain text for an uploaded document.
pub trait TextExtractor: Send + Sync {
    /// Extract the document's text, page by page, each page followed by a newline.
    fn extract(&self, document: &[u8]) -> Result<String, ExtractionError>;
}

/// Extractor for PDF documents backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, document: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(document)
            .map_err(|err| ExtractionError::Unreadable(err.to_string()))?;

        let pages = doc.get_pages();
        let mut text = String::new();
        for page_number in pages.keys().copied() {
            match doc.extract_text(&[page_number]) {
                Ok(page_text) if !page_text.is_empty() => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Ok(_) => debug!(page = page_number, "page has no text"),
                Err(err) => warn!(page = page_number, error = %err, "skipping undecodable page"),
            }
        }

        debug!(pages = pages.len(), chars = text.len(), "pdf text extracted");
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(text)
    }
}
