//! Benchmark data types and BEIR-format loaders.
//!
//! BEIR datasets ship as:
//! - `corpus.jsonl`: one `{"_id", "title", "text", ...}` object per line
//! - `queries.jsonl`: one `{"_id", "text"}` object per line
//! - `qrels/<split>.tsv`: `query-id<TAB>corpus-id<TAB>score` with a header row

use crate::error::{CoveoError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A corpus entry: field name to value, e.g. `{"title": ..., "text": ...}`.
pub type Document = Map<String, Value>;

/// Document id to document.
pub type Corpus = BTreeMap<String, Document>;

/// Query id to query text.
pub type Queries = BTreeMap<String, String>;

/// Query id to (corpus id to relevance score).
pub type Results = BTreeMap<String, BTreeMap<String, f64>>;

/// Query id to (corpus id to graded judgement).
pub type Qrels = BTreeMap<String, BTreeMap<String, i32>>;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CoveoError::io(path, e))
}

fn parse_line(path: &Path, line_num: usize, line: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(line).map_err(|e| CoveoError::Dataset {
        path: path.to_path_buf(),
        line: line_num,
        reason: e.to_string(),
    })
}

fn take_id(path: &Path, line_num: usize, object: &mut Map<String, Value>) -> Result<String> {
    match object.remove("_id") {
        Some(Value::String(id)) => Ok(id),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(CoveoError::Dataset {
            path: path.to_path_buf(),
            line: line_num,
            reason: "missing string field '_id'".to_string(),
        }),
    }
}

/// Load a BEIR `corpus.jsonl` file.
///
/// Every field except `_id` and `metadata` is kept on the document.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let content = read(path)?;
    let mut corpus = Corpus::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut object = parse_line(path, idx + 1, line)?;
        let id = take_id(path, idx + 1, &mut object)?;
        object.remove("metadata");
        corpus.insert(id, object);
    }

    Ok(corpus)
}

/// Load a BEIR `queries.jsonl` file.
pub fn load_queries(path: &Path) -> Result<Queries> {
    let content = read(path)?;
    let mut queries = Queries::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut object = parse_line(path, idx + 1, line)?;
        let id = take_id(path, idx + 1, &mut object)?;
        let text = match object.remove("text") {
            Some(Value::String(text)) => text,
            _ => {
                return Err(CoveoError::Dataset {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: "missing string field 'text'".to_string(),
                });
            }
        };
        queries.insert(id, text);
    }

    Ok(queries)
}

/// Load a BEIR qrels TSV file. The first row is a header and is skipped.
pub fn load_qrels(path: &Path) -> Result<Qrels> {
    let content = read(path)?;
    let mut qrels = Qrels::new();

    for (idx, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let malformed = |reason: String| CoveoError::Dataset {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        };

        if fields.len() < 3 {
            return Err(malformed(format!(
                "expected 3 tab-separated fields, found {}",
                fields.len()
            )));
        }

        let score: i32 = fields[2]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("invalid score '{}'", fields[2].trim())))?;

        qrels
            .entry(fields[0].to_string())
            .or_default()
            .insert(fields[1].to_string(), score);
    }

    Ok(qrels)
}
