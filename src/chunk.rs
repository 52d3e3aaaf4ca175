//! Overlapping word-window chunker.
//!
//! Splits page text into fixed-size windows of whitespace-separated
//! words. Consecutive windows share `overlap` words so that passages
//! straddling a window boundary are never lost.
//!
//! Chunking is a pure function: identical input and parameters always
//! produce the identical sequence.

use anyhow::{bail, Result};

use crate::models::{Chunk, Page};

/// Split `text` into word windows of `size` words advancing by
/// `size - overlap` words each step.
///
/// The final window may be shorter than `size`. Empty text yields an
/// empty vector. Requires `overlap < size`; anything else would stall
/// or walk backwards.
pub fn chunk_words(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    if size == 0 || overlap >= size {
        bail!(
            "invalid chunking parameters: size={}, overlap={} (need 0 <= overlap < size)",
            size,
            overlap
        );
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let stride = size - overlap;
    let mut out = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = (start + size).min(words.len());
        out.push(words[start..end].join(" "));
        start += stride;
    }

    Ok(out)
}

/// Chunk one page, attaching source metadata in emission order.
pub fn chunk_page(page: &Page, size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    let windows = chunk_words(&page.text, size, overlap)?;
    Ok(windows
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            source_id: page.source_id.clone(),
            page_number: page.page_number,
            chunk_index: i,
            text,
        })
        .collect())
}
