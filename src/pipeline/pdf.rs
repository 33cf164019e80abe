//! Upload-to-text boundary.
//!
//! PDF conversion is delegated to `pdf-extract`; plain text is decoded as
//! UTF-8. Documents without a text layer are rejected rather than processed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Document has no extractable text (scanned or image-only)")]
    NoExtractableText,

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Turns uploaded bytes into report text.
pub trait TextSource: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, SourceError>;
}

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; pages are joined with a newline.
pub struct PdfTextExtractor;

impl TextSource for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, SourceError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| SourceError::PdfParsing(e.to_string()))?;

        let text = pages.join("\n");
        if text.trim().is_empty() {
            return Err(SourceError::NoExtractableText);
        }
        tracing::debug!(pages = pages.len(), chars = text.len(), "PDF text extracted");
        Ok(text)
    }
}

/// UTF-8 text files; invalid sequences are replaced.
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, SourceError> {
        let text = String::from_utf8_lossy(bytes).into_owned();
        if text.trim().is_empty() {
            return Err(SourceError::NoExtractableText);
        }
        Ok(text)
    }
}

/// Upload formats we accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Pdf,
    PlainText,
}

impl UploadFormat {
    /// Detect from magic bytes first, then from the filename.
    pub fn detect(filename: &str, bytes: &[u8]) -> Result<Self, SourceError> {
        if bytes.starts_with(b"%PDF") {
            return Ok(Self::Pdf);
        }
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("application", "pdf") => Ok(Self::Pdf),
            ("text", _) => Ok(Self::PlainText),
            _ => Err(SourceError::UnsupportedFormat(mime.essence_str().to_string())),
        }
    }

    pub fn source(self) -> Box<dyn TextSource> {
        match self {
            Self::Pdf => Box::new(PdfTextExtractor),
            Self::PlainText => Box::new(PlainTextSource),
        }
    }
}

/// Extract report text from an uploaded file.
pub fn extract_upload(filename: &str, bytes: &[u8]) -> Result<String, SourceError> {
    let format = UploadFormat::detect(filename, bytes)?;
    tracing::debug!(format = ?format, size = bytes.len(), "Extracting upload");
    format.source().extract_text(bytes)
}
