//! Corpus directory scan and page loading.
//!
//! The corpus is a flat directory of downloaded filings named
//! `{TICKER}_{YEAR}{ext}`. Scanning keeps only files whose extension
//! maps to a [`DocumentFormat`]; everything else is ignored.

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::extract::{self, DocumentFormat};
use crate::models::Page;

/// A corpus member with its resolved format.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    pub path: PathBuf,
    pub format: DocumentFormat,
    /// File name, used as the citation id on pages and chunks.
    pub source_id: String,
}

/// Scan the corpus directory for accepted filing files.
///
/// Returns files name-sorted so index builds are deterministic. A
/// missing directory yields an empty corpus, which the caller treats
/// as fatal after the fetch stage has run.
pub fn scan_corpus(dir: &Path) -> Result<Vec<CorpusFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path().to_path_buf();
        let Some(format) = DocumentFormat::from_path(&path) else {
            continue;
        };
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        files.push(CorpusFile {
            path,
            format,
            source_id,
        });
    }

    files.sort_by(|a, b| a.source_id.cmp(&b.source_id));
    Ok(files)
}

/// Extract the pages of every corpus file, in corpus order.
///
/// Extraction failures degrade to a single empty-text page with a
/// warning so one malformed filing never blocks the rest.
pub fn load_pages(files: &[CorpusFile]) -> Vec<Page> {
    let mut pages = Vec::new();
    for file in files {
        match extract::extract_pages(&file.path, file.format, &file.source_id) {
            Ok(mut extracted) => pages.append(&mut extracted),
            Err(e) => {
                eprintln!("Warning: could not extract {}: {}", file.source_id, e);
                pages.push(Page {
                    source_id: file.source_id.clone(),
                    page_number: 1,
                    text: String::new(),
                });
            }
        }
    }
    pages
}
