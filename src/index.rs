//! Embedding index: build, cache, load.
//!
//! An [`EmbeddingIndex`] is the aligned pair of vectors and chunk
//! metadata that similarity search runs over. `vectors[i]` embeds
//! `chunks[i]`; the two sequences are only ever grown in lock-step, and
//! nothing mutates them after the build.
//!
//! A flat cache artifact short-circuits building: when it exists it is
//! loaded and returned as-is, with no check against the current corpus
//! or parameters. Delete the artifact to force a rebuild.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::chunk::chunk_page;
use crate::config::Config;
use crate::corpus::{self, CorpusFile};
use crate::embedding::{self, EmbeddingProvider};
use crate::models::Chunk;

/// The searchable index over one corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingIndex {
    /// Identity of the model that produced the vectors.
    pub model: String,
    /// Unit-normalized embedding vectors, one per chunk.
    pub vectors: Vec<Vec<f32>>,
    /// Chunk metadata, position-aligned with `vectors`.
    pub chunks: Vec<Chunk>,
}

impl EmbeddingIndex {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Where a built index is persisted and reloaded from.
///
/// A trait rather than a fixed file path so tests can substitute an
/// in-memory store.
pub trait CacheStore {
    /// Load the cached index, `None` when no artifact exists.
    fn load(&self) -> Result<Option<EmbeddingIndex>>;
    /// Persist the index, replacing any previous artifact.
    fn save(&self, index: &EmbeddingIndex) -> Result<()>;
}

/// File-backed cache holding one bincode-serialized index.
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CacheStore for FileCache {
    fn load(&self) -> Result<Option<EmbeddingIndex>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Failed to open cache file: {}", self.path.display()))?;
        let index: EmbeddingIndex = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("Failed to decode cache file: {}", self.path.display()))?;
        Ok(Some(index))
    }

    fn save(&self, index: &EmbeddingIndex) -> Result<()> {
        let file = std::fs::File::create(&self.path)
            .with_context(|| format!("Failed to create cache file: {}", self.path.display()))?;
        bincode::serialize_into(BufWriter::new(file), index)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory cache for tests and embedded use.
#[derive(Default)]
pub struct MemoryCache {
    slot: Mutex<Option<EmbeddingIndex>>,
}

impl CacheStore for MemoryCache {
    fn load(&self) -> Result<Option<EmbeddingIndex>> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, index: &EmbeddingIndex) -> Result<()> {
        *self.slot.lock().unwrap() = Some(index.clone());
        Ok(())
    }
}

/// Build the index for a corpus, or return the cached one.
///
/// A cache hit always wins, whatever the current corpus looks like.
/// Otherwise every page of every file is chunked, the full chunk-text
/// sequence is embedded in one batched call, and the result is
/// persisted best-effort: a failed save is a warning, not a failed
/// build. An empty corpus yields an empty index without invoking the
/// embedding model.
pub async fn build_index(
    files: &[CorpusFile],
    config: &Config,
    cache: &dyn CacheStore,
    provider: &dyn EmbeddingProvider,
) -> Result<EmbeddingIndex> {
    match cache.load() {
        Ok(Some(index)) => {
            println!("Loading cached embeddings ({} chunks)...", index.len());
            if index.model != provider.model_name() {
                eprintln!(
                    "Warning: cache was built with model '{}' but config selects '{}'; \
                     delete the cache artifact to rebuild",
                    index.model,
                    provider.model_name()
                );
            }
            return Ok(index);
        }
        Ok(None) => {}
        Err(e) => eprintln!("Warning: ignoring unreadable cache: {}", e),
    }

    println!("Building embeddings... (this may take a couple of minutes)");

    let mut texts: Vec<String> = Vec::new();
    let mut chunks: Vec<Chunk> = Vec::new();

    for page in corpus::load_pages(files) {
        for chunk in chunk_page(&page, config.chunking.size, config.chunking.overlap)? {
            texts.push(chunk.text.clone());
            chunks.push(chunk);
        }
    }

    let vectors = if texts.is_empty() {
        Vec::new()
    } else {
        embedding::embed_texts(provider, &config.embedding, &texts).await?
    };

    let index = EmbeddingIndex {
        model: provider.model_name().to_string(),
        vectors,
        chunks,
    };

    if let Err(e) = cache.save(&index) {
        eprintln!("Warning: could not persist embedding cache: {}", e);
    }

    Ok(index)
}
