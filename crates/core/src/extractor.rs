use crate::error::IndexError;
use lopdf::Document;
use std::path::Path;

/// Text extraction seam; swap in an OCR-backed extractor for scanned PDFs.
pub trait PdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, IndexError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, IndexError> {
        let document =
            Document::load(path).map_err(|error| IndexError::Extraction(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IndexError::Extraction(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(text);
            }
        }

        if pages.is_empty() {
            return Err(IndexError::Extraction(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(pages.join("\n"))
    }
}

/// Extracts all page text from the PDF at `path`, joined with newlines.
pub fn pdf_to_text(path: &Path) -> Result<String, IndexError> {
    LopdfExtractor.extract_text(path)
}
