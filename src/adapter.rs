//! The retrieval adapter plugged into the benchmark harness.
//!
//! [`CoveoSearch`] indexes a corpus into a Coveo push source the first time
//! it is asked to search, then sends one query per benchmark query and keeps
//! the vendor's scores.

use crate::batch::{batch_count, batches};
use crate::config::CoveoConfig;
use crate::corpus::{Corpus, Queries, Results};
use crate::diagnostics::Diagnostic;
use crate::document::{PreparedDocument, prepare_document};
use crate::error::Result;
use crate::push::PushClient;
use crate::search::{QueryOutcome, SearchClient, score_map};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Summary of one indexing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexReport {
    /// Documents prepared and sent.
    pub documents: usize,
    /// Batches attempted.
    pub batches: usize,
    /// Batches with at least one failed push step.
    pub failed_batches: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl IndexReport {
    /// Every batch went through all three push steps.
    pub fn is_clean(&self) -> bool {
        self.failed_batches == 0
    }
}

/// Coveo-backed retriever.
pub struct CoveoSearch {
    config: CoveoConfig,
    indexed: bool,
    diagnostics: Vec<Diagnostic>,
}

impl CoveoSearch {
    /// Create an adapter; the configuration is validated here.
    pub fn new(config: CoveoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            indexed: config.assume_indexed,
            config,
            diagnostics: Vec::new(),
        })
    }

    pub fn config(&self) -> &CoveoConfig {
        &self.config
    }

    /// Whether `search` will skip indexing.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Declare the source already populated.
    pub fn mark_indexed(&mut self) {
        self.indexed = true;
    }

    /// Failures recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the recorded failures.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Push the whole corpus, one batch at a time.
    ///
    /// A non-success status at any push step is recorded and the run moves
    /// on. The adapter counts as indexed only when no batch failed.
    pub async fn index(&mut self, corpus: &Corpus) -> Result<IndexReport> {
        let batch_size = self.config.batch_size()?;
        let client = PushClient::new(&self.config)?;

        info!(
            documents = corpus.len(),
            batches = batch_count(corpus.len(), batch_size),
            "indexing corpus"
        );

        let progress = self.progress(corpus.len() as u64, "docs");
        let mut report = IndexReport::default();

        for (batch, entries) in batches(corpus.iter(), batch_size).enumerate() {
            let documents = entries
                .into_iter()
                .map(|(id, document)| prepare_document(id, document, &self.config.fields))
                .collect::<Result<Vec<PreparedDocument>>>()?;

            let diagnostics = client.push_batch(batch, &documents).await?;

            report.batches += 1;
            report.documents += documents.len();
            if !diagnostics.is_empty() {
                report.failed_batches += 1;
            }
            report.diagnostics.extend(diagnostics);
            progress.inc(documents.len() as u64);
        }

        progress.finish_and_clear();
        self.diagnostics.extend(report.diagnostics.iter().cloned());

        if report.is_clean() {
            self.indexed = true;
        } else {
            warn!(
                failed = report.failed_batches,
                batches = report.batches,
                "some batches were not ingested"
            );
        }

        info!(
            documents = report.documents,
            batches = report.batches,
            "indexing finished"
        );
        Ok(report)
    }

    /// Retrieve scores for every query, indexing `corpus` first if needed.
    ///
    /// `top_k` is accepted for harness compatibility; the number of hits is
    /// governed by `results_per_query`. Rejected queries are absent from the
    /// returned map.
    pub async fn search(
        &mut self,
        corpus: &Corpus,
        queries: &Queries,
        top_k: usize,
    ) -> Result<Results> {
        if !self.indexed {
            self.index(corpus).await?;
        }

        let client = SearchClient::new(&self.config)?;
        debug!(
            top_k,
            results_per_query = self.config.results_per_query,
            "searching"
        );

        let progress = self.progress(queries.len() as u64, "queries");
        let mut results = Results::new();

        for (query_id, text) in queries {
            match client.query(text).await? {
                QueryOutcome::Hits(hits) => {
                    debug!(query_id = %query_id, hits = hits.len(), "query answered");
                    results.insert(query_id.clone(), score_map(&hits));
                }
                QueryOutcome::Rejected { status, body } => {
                    let diagnostic = Diagnostic::Query {
                        query_id: query_id.clone(),
                        status,
                        body,
                    };
                    warn!("{}", diagnostic);
                    self.diagnostics.push(diagnostic);
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            queries = queries.len(),
            answered = results.len(),
            "search finished"
        );
        Ok(results)
    }

    /// Run a single ad-hoc query without touching the index.
    pub async fn query(&self, text: &str) -> Result<QueryOutcome> {
        SearchClient::new(&self.config)?.query(text).await
    }

    fn progress(&self, len: u64, unit: &str) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {}",
            unit
        );
        if let Ok(style) = ProgressStyle::default_bar().template(&template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config() -> CoveoConfig {
        let mut config = Config::with_credentials("org", "src", "push", "search").coveo;
        config.show_progress = false;
        config
    }

    #[test]
    fn test_new_validates() {
        assert!(CoveoSearch::new(CoveoConfig::default()).is_err());
        let adapter = CoveoSearch::new(config()).unwrap();
        assert!(!adapter.is_indexed());
        assert!(adapter.diagnostics().is_empty());
    }

    #[test]
    fn test_assume_indexed() {
        let mut cfg = config();
        cfg.assume_indexed = true;
        assert!(CoveoSearch::new(cfg).unwrap().is_indexed());

        let mut adapter = CoveoSearch::new(config()).unwrap();
        adapter.mark_indexed();
        assert!(adapter.is_indexed());
    }

    #[test]
    fn test_report_clean() {
        let mut report = IndexReport::default();
        assert!(report.is_clean());
        report.failed_batches = 1;
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_index_rejects_bad_document_before_network() {
        let mut cfg = config();
        cfg.push_api_base = Some("http://127.0.0.1:9".to_string());
        let mut adapter = CoveoSearch::new(cfg).unwrap();

        let mut corpus = Corpus::new();
        corpus.insert("d1".to_string(), serde_json::Map::new());

        let err = adapter.index(&corpus).await.unwrap_err();
        assert!(matches!(err, crate::error::CoveoError::InvalidDocument { .. }));
        assert!(!adapter.is_indexed());
    }
}
