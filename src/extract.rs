//! Per-page text extraction for downloaded filings.
//!
//! Filings arrive in one of two shapes: paginated PDF or a single HTML
//! document. The format is picked once per file from its extension;
//! extraction returns plain-text [`Page`]s and nothing else — no
//! download or corpus logic lives here.

use std::path::Path;

use crate::models::Page;

/// Filing formats accepted into the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Paginated binary document; one [`Page`] per physical page.
    Pdf,
    /// Markup document; the whole body becomes a single [`Page`].
    Html,
}

impl DocumentFormat {
    /// Select a format from a file extension. Files with any other
    /// extension are not corpus members.
    pub fn from_path(path: &Path) -> Option<DocumentFormat> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Some(DocumentFormat::Pdf),
            Some(ext) if ext.eq_ignore_ascii_case("htm") || ext.eq_ignore_ascii_case("html") => {
                Some(DocumentFormat::Html)
            }
            _ => None,
        }
    }
}

/// Extraction error. Callers degrade to an empty page rather than
/// letting one malformed filing block the rest of the corpus.
#[derive(Debug)]
pub enum ExtractError {
    Io(String),
    Pdf(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Io(e) => write!(f, "read failed: {}", e),
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract the pages of one filing.
///
/// `source_id` is carried onto every page so chunks can cite their
/// origin. PDF pages are numbered from 1; HTML yields page 1 only.
pub fn extract_pages(
    path: &Path,
    format: DocumentFormat,
    source_id: &str,
) -> Result<Vec<Page>, ExtractError> {
    match format {
        DocumentFormat::Pdf => extract_pdf_pages(path, source_id),
        DocumentFormat::Html => extract_html_page(path, source_id),
    }
}

fn extract_pdf_pages(path: &Path, source_id: &str) -> Result<Vec<Page>, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Io(e.to_string()))?;
    let texts = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    Ok(texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Page {
            source_id: source_id.to_string(),
            page_number: i + 1,
            text,
        })
        .collect())
}

fn extract_html_page(path: &Path, source_id: &str) -> Result<Vec<Page>, ExtractError> {
    let html = std::fs::read_to_string(path).map_err(|e| ExtractError::Io(e.to_string()))?;
    Ok(vec![Page {
        source_id: source_id.to_string(),
        page_number: 1,
        text: html_body_text(&html),
    }])
}

/// Flatten an HTML document to its visible text, whitespace-collapsed.
///
/// Script and style contents are dropped; everything else is joined
/// with single spaces, mirroring what a text-mode render would keep.
pub fn html_body_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let skip = ["script", "style", "noscript"];

    let mut words: Vec<String> = Vec::new();
    let root = document.root_element();
    collect_text(&root, &skip, &mut words);
    words.join(" ")
}

fn collect_text(element: &scraper::ElementRef, skip: &[&str], out: &mut Vec<String>) {
    if skip.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.extend(text.split_whitespace().map(|w| w.to_string()));
        } else if let Some(el) = scraper::ElementRef::wrap(child) {
            collect_text(&el, skip, out);
        }
    }
}
