//! Coveo BEIR adapter - run retrieval benchmarks against a Coveo organization.
//!
//! The corpus is pushed into a Coveo push source and each benchmark query is
//! sent to the Search API; Coveo does all the ranking. What lives here is
//! the plumbing around it:
//! 1. Compress and encode each document into the Push API schema
//! 2. Push the corpus in bounded batches through the file-container flow
//! 3. Turn queries into keyword disjunctions and collect the hit scores
//!
//! # Quick Start
//!
//! ```no_run
//! use coveo_beir::{
//!     adapter::CoveoSearch,
//!     config::Config,
//!     corpus::{load_corpus, load_queries},
//!     persistence::save_results,
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let mut adapter = CoveoSearch::new(config.coveo)?;
//!
//!     let corpus = load_corpus(Path::new("scifact/corpus.jsonl"))?;
//!     let queries = load_queries(Path::new("scifact/queries.jsonl"))?;
//!
//!     // Indexes on first use, then queries
//!     let results = adapter.search(&corpus, &queries, 100).await?;
//!     save_results(&results, Path::new("results.json"))?;
//!
//!     for diagnostic in adapter.take_diagnostics() {
//!         eprintln!("{}", diagnostic);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **CoveoSearch**: the adapter; index-once latch, search loop, diagnostics
//! - **PushClient**: file container, upload and batch commit calls
//! - **SearchClient**: Search API v3 queries
//! - **prepare_document**: corpus entry to Push API payload

pub mod adapter;
pub mod batch;
pub mod config;
pub mod corpus;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod http;
pub mod persistence;
pub mod push;
pub mod search;

// Re-export commonly used types
pub use adapter::{CoveoSearch, IndexReport};
pub use config::{Config, CoveoConfig, FieldMapping};
pub use corpus::{Corpus, Queries, Results};
pub use diagnostics::Diagnostic;
pub use document::{PreparedDocument, prepare_document};
pub use error::{CoveoError, Result};
pub use persistence::{load_results, save_results};
