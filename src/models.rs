//! Core data models for the retrieval pipeline.
//!
//! These types represent the pages, chunks, and results that flow from
//! extraction through indexing to the final answer.

use serde::{Deserialize, Serialize};

/// One page of extracted plain text from a filing.
///
/// PDFs yield one `Page` per physical page; HTML filings yield a single
/// page numbered 1.
#[derive(Debug, Clone)]
pub struct Page {
    /// Corpus file name this page came from (e.g. `MSFT_2023.htm`).
    pub source_id: String,
    /// 1-based page number within the filing.
    pub page_number: usize,
    pub text: String,
}

/// A fixed-size overlapping word window cut from one page.
///
/// The unit of embedding and retrieval. Chunks are accumulated in
/// lock-step with their vectors; `vectors[i]` always describes
/// `chunks[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub source_id: String,
    pub page_number: usize,
    /// Position of this chunk within its page's chunk sequence.
    pub chunk_index: usize,
    pub text: String,
}

/// A supporting excerpt attached to a [`RetrievalResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source_id: String,
    pub page_number: usize,
    /// Leading slice of the matching chunk, excerpt-length capped.
    pub excerpt: String,
}

/// The structured answer produced for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    /// Reserved for query decomposition; currently always `[query]`.
    pub sub_queries: Vec<String>,
    pub reasoning: String,
    pub sources: Vec<SourceRef>,
    pub answer: String,
}
