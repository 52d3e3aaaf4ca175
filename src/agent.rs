//! Retrieval agent: one query in, one structured answer out.
//!
//! Single-turn and single-hop: the query is embedded once, searched
//! once, and answered extractively from the top hit. The result schema
//! reserves `sub_queries` for decomposition, but today it always holds
//! the original query alone.

use anyhow::Result;

use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::index::EmbeddingIndex;
use crate::models::{RetrievalResult, SourceRef};
use crate::search::{search, Hit};

const FOUND_REASONING: &str = "Retrieved most relevant text from filings.";
const NOT_FOUND_REASONING: &str = "Search returned empty.";
const NOT_FOUND_ANSWER: &str = "No relevant information found.";

/// Answer a query against a built index.
///
/// The query is embedded through the same provider and normalization
/// that produced the index vectors; anything else would score in a
/// mismatched space.
pub async fn answer(
    query: &str,
    provider: &dyn EmbeddingProvider,
    config: &Config,
    index: &EmbeddingIndex,
) -> Result<RetrievalResult> {
    let query_vec = embedding::embed_query(provider, &config.embedding, query).await?;
    let hits = search(&query_vec, index, config.retrieval.top_k);
    Ok(assemble(query, &hits, config))
}

/// Package ranked hits into a [`RetrievalResult`].
///
/// The answer is the full text of the top hit; sources are the leading
/// hits reduced to excerpt-length citations. With no hits the result is
/// a well-formed "not found" shape rather than an error.
pub fn assemble(query: &str, hits: &[Hit], config: &Config) -> RetrievalResult {
    let mut result = RetrievalResult {
        query: query.to_string(),
        sub_queries: vec![query.to_string()],
        reasoning: String::new(),
        sources: Vec::new(),
        answer: String::new(),
    };

    match hits.first() {
        Some(best) => {
            result.answer = best.chunk.text.clone();
            result.reasoning = FOUND_REASONING.to_string();
            result.sources = hits
                .iter()
                .take(config.retrieval.max_sources)
                .map(|h| SourceRef {
                    source_id: h.chunk.source_id.clone(),
                    page_number: h.chunk.page_number,
                    excerpt: truncate_chars(&h.chunk.text, config.retrieval.excerpt_chars),
                })
                .collect();
        }
        None => {
            result.answer = NOT_FOUND_ANSWER.to_string();
            result.reasoning = NOT_FOUND_REASONING.to_string();
        }
    }

    result
}

/// First `max_chars` characters of `text`, safe on multi-byte input.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;

    fn hit(source_id: &str, page_number: usize, text: &str, score: f32) -> Hit {
        Hit {
            score,
            chunk: Chunk {
                source_id: source_id.to_string(),
                page_number,
                chunk_index: 0,
                text: text.to_string(),
            },
        }
    }

    #[test]
    fn single_hit_answer_is_full_chunk_text() {
        let config = Config::minimal();
        let hits = vec![hit(
            "MSFT_2023.htm",
            1,
            "Revenue increased 12% year over year.",
            0.91,
        )];
        let result = assemble("how did revenue change?", &hits, &config);

        assert_eq!(result.answer, "Revenue increased 12% year over year.");
        assert_eq!(result.reasoning, FOUND_REASONING);
        assert_eq!(result.sub_queries, vec!["how did revenue change?"]);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].source_id, "MSFT_2023.htm");
        assert_eq!(result.sources[0].page_number, 1);
        // shorter than the excerpt cap, so unchanged
        assert_eq!(result.sources[0].excerpt, result.answer);
    }

    #[test]
    fn sources_are_top_three_of_five_hits() {
        let config = Config::minimal();
        let hits: Vec<Hit> = (0..5)
            .map(|i| hit(&format!("doc{}.htm", i), i + 1, &format!("text {}", i), 1.0 - i as f32 * 0.1))
            .collect();
        let result = assemble("q", &hits, &config);

        assert_eq!(result.answer, "text 0");
        assert_eq!(result.sources.len(), 3);
        let ids: Vec<&str> = result.sources.iter().map(|s| s.source_id.as_str()).collect();
        assert_eq!(ids, vec!["doc0.htm", "doc1.htm", "doc2.htm"]);
    }

    #[test]
    fn excerpt_truncated_to_excerpt_chars() {
        let config = Config::minimal();
        let long_text = "word ".repeat(100); // 500 chars
        let hits = vec![hit("doc.htm", 2, &long_text, 0.5)];
        let result = assemble("q", &hits, &config);

        assert_eq!(result.sources[0].excerpt.chars().count(), 200);
        assert!(long_text.starts_with(&result.sources[0].excerpt));
        // the answer itself is never truncated
        assert_eq!(result.answer, long_text);
    }

    #[test]
    fn excerpt_truncation_is_char_boundary_safe() {
        let config = Config::minimal();
        let text = "é".repeat(300);
        let hits = vec![hit("doc.htm", 1, &text, 0.5)];
        let result = assemble("q", &hits, &config);
        assert_eq!(result.sources[0].excerpt.chars().count(), 200);
    }

    #[test]
    fn no_hits_yields_not_found_shape() {
        let config = Config::minimal();
        let result = assemble("anything at all", &[], &config);

        assert_eq!(result.answer, NOT_FOUND_ANSWER);
        assert_eq!(result.reasoning, NOT_FOUND_REASONING);
        assert!(result.sources.is_empty());
        assert_eq!(result.query, "anything at all");
        assert_eq!(result.sub_queries, vec!["anything at all"]);
    }

    #[test]
    fn result_serializes_to_expected_json_shape() {
        let config = Config::minimal();
        let hits = vec![hit("GOOGL_2022.html", 1, "Search advertising revenue.", 0.8)];
        let result = assemble("ads?", &hits, &config);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["query"], "ads?");
        assert_eq!(json["sub_queries"][0], "ads?");
        assert_eq!(json["answer"], "Search advertising revenue.");
        assert_eq!(json["sources"][0]["source_id"], "GOOGL_2022.html");
        assert_eq!(json["sources"][0]["page_number"], 1);
    }
}
