//! Record source interfaces.
//!
//! Ownership model:
//! - `RecordSource` is the merge-facing interface; each `open` call starts a
//!   fresh pass over the source.
//! - `RecordStream` is one pass, drained to the end by the merger before the
//!   next source is opened.

use crate::config::MergeConfig;
use crate::data::Record;
use crate::errors::MergeError;
use crate::types::SourceId;

#[cfg(feature = "huggingface")]
/// Hugging Face hub download of the dataset files.
pub mod huggingface;
/// JSON-lines reader and file-backed source.
pub mod jsonl;

pub use jsonl::{JsonlRecords, JsonlSource, read_jsonl};

/// One pass over a source's records.
pub trait RecordStream: Iterator<Item = Record> {
    /// Lines skipped during this pass because they did not parse.
    fn malformed_lines(&self) -> usize {
        0
    }
}

/// Merge-facing record source.
pub trait RecordSource {
    /// Stable source identifier used in logs and statistics.
    fn id(&self) -> &str;
    /// Start a pass over the source's records.
    ///
    /// Return `SourceUnavailable` when the backing data does not exist; the
    /// merger logs it and moves on.
    fn open(&self) -> Result<Box<dyn RecordStream + '_>, MergeError>;
}

/// Source backed by prebuilt records, useful for tests and composition.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    id: SourceId,
    records: Vec<Record>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(id: impl Into<SourceId>, records: Vec<Record>) -> Self {
        Self {
            id: id.into(),
            records,
        }
    }
}

struct InMemoryStream<'a> {
    inner: std::slice::Iter<'a, Record>,
}

impl Iterator for InMemoryStream<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.inner.next().cloned()
    }
}

impl RecordStream for InMemoryStream<'_> {}

impl RecordSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> Result<Box<dyn RecordStream + '_>, MergeError> {
        Ok(Box::new(InMemoryStream {
            inner: self.records.iter(),
        }))
    }
}

/// Build file-backed sources for every configured file, in merge order.
pub fn sources_from_config(config: &MergeConfig) -> Vec<Box<dyn RecordSource>> {
    config
        .source_paths()
        .into_iter()
        .map(|path| Box::new(JsonlSource::new(path)) as Box<dyn RecordSource>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn in_memory_source_replays_records_on_every_open() {
        let record = Record::from_value(json!({"id": "a", "text": "t"})).unwrap();
        let source = InMemorySource::new("memory", vec![record.clone()]);
        assert_eq!(source.id(), "memory");
        for _ in 0..2 {
            let records: Vec<_> = source.open().unwrap().collect();
            assert_eq!(records, vec![record.clone()]);
        }
    }

    #[test]
    fn config_sources_keep_file_order() {
        let config = MergeConfig::new("/data").with_source_files(["b.jsonl", "a.jsonl"]);
        let ids: Vec<_> = sources_from_config(&config)
            .iter()
            .map(|source| source.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b.jsonl", "a.jsonl"]);
    }
}
