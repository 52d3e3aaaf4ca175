//! Cosine similarity search over an [`EmbeddingIndex`].
//!
//! Index vectors and query vectors are both unit-normalized, so the
//! relevance score is a plain dot product. Ranking is a stable
//! descending sort: equal scores keep their insertion order, which
//! keeps results deterministic run to run.

use crate::embedding::dot;
use crate::index::EmbeddingIndex;
use crate::models::Chunk;

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct Hit {
    pub score: f32,
    pub chunk: Chunk,
}

/// Rank every indexed chunk against `query_vec` and return the top
/// `topk`, highest similarity first.
///
/// An empty index yields an empty result. Output length is
/// `min(topk, index.len())`.
pub fn search(query_vec: &[f32], index: &EmbeddingIndex, topk: usize) -> Vec<Hit> {
    if index.is_empty() || topk == 0 {
        return Vec::new();
    }

    let mut hits: Vec<Hit> = index
        .vectors
        .iter()
        .zip(index.chunks.iter())
        .map(|(vec, chunk)| Hit {
            score: dot(query_vec, vec),
            chunk: chunk.clone(),
        })
        .collect();

    // sort_by is stable: ties stay in insertion order
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(topk);
    hits
}
