//! # edgarq
//!
//! Ask natural-language questions of SEC 10-K filings via local
//! semantic retrieval.
//!
//! edgarq downloads annual reports from the EDGAR archive, splits them
//! into overlapping word windows, embeds the windows into a vector
//! space, and answers a query extractively with the nearest chunk plus
//! supporting citations.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────┐   ┌─────────┐   ┌─────────────┐   ┌────────┐
//! │ EDGAR  │──▶│ Extract │──▶│ Chunk+Embed │──▶│ Search │
//! │ fetch  │   │ PDF/HTML│   │  (cached)    │   │ +Agent │
//! └────────┘   └─────────┘   └─────────────┘   └────────┘
//! ```
//!
//! Data flows strictly forward: raw filings → pages → chunks →
//! vectors+metadata → ranked hits → one structured answer.
//!
//! ## Quick Start
//!
//! ```bash
//! edgarq "How did Microsoft's cloud revenue change?"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`edgar`] | EDGAR document source |
//! | [`extract`] | PDF/HTML page extraction |
//! | [`corpus`] | Corpus directory scan |
//! | [`chunk`] | Overlapping word-window chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Index build and cache |
//! | [`search`] | Cosine similarity search |
//! | [`agent`] | Query answering |

pub mod agent;
pub mod chunk;
pub mod config;
pub mod corpus;
pub mod edgar;
pub mod embedding;
pub mod extract;
pub mod index;
pub mod models;
pub mod search;
