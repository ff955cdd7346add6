use tracing::{debug, info, warn};

use crate::config::MergeConfig;
use crate::data::{InsertOutcome, MergedCollection, Record};
use crate::errors::MergeError;
use crate::source::{RecordSource, sources_from_config};

/// Counters describing one merge run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Sources opened and drained.
    pub sources_read: usize,
    /// Sources that could not be opened and contributed nothing.
    pub sources_missing: usize,
    /// Records offered to the collection.
    pub records_seen: usize,
    /// Records stored.
    pub accepted: usize,
    /// Records dropped for lacking an id.
    pub missing_id: usize,
    /// Records dropped because their id was already stored.
    pub duplicates: usize,
    /// Records dropped for absent or empty text.
    pub empty_text: usize,
    /// Lines skipped by readers because they did not parse.
    pub malformed_lines: usize,
}

/// Builds a `MergedCollection` from sources drained one after another.
///
/// Sources are merged in the order they are ingested; the first record seen
/// for an id wins.
#[derive(Debug, Default)]
pub struct Merger {
    collection: MergedCollection,
    stats: MergeStats,
}

impl Merger {
    /// Create an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain `source` into the collection.
    ///
    /// A source that cannot be opened is logged and counted, never fatal.
    pub fn ingest_source(&mut self, source: &dyn RecordSource) {
        let mut stream = match source.open() {
            Ok(stream) => stream,
            Err(err) => {
                warn!(source_id = source.id(), error = %err, "source not found; skipping");
                self.stats.sources_missing += 1;
                return;
            }
        };
        info!(source_id = source.id(), "processing source");
        let before = self.stats.accepted;
        for record in stream.by_ref() {
            self.offer(source.id(), record);
        }
        self.stats.malformed_lines += stream.malformed_lines();
        self.stats.sources_read += 1;
        debug!(
            source_id = source.id(),
            accepted = self.stats.accepted - before,
            "source drained"
        );
    }

    /// Offer records that did not come from a `RecordSource`.
    pub fn ingest<I>(&mut self, source_id: &str, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        for record in records {
            self.offer(source_id, record);
        }
    }

    fn offer(&mut self, source_id: &str, record: Record) {
        self.stats.records_seen += 1;
        let id_for_log = record.id().map(|id| id.into_owned());
        match self.collection.insert(record) {
            InsertOutcome::Inserted => self.stats.accepted += 1,
            InsertOutcome::MissingId => self.stats.missing_id += 1,
            InsertOutcome::EmptyText => self.stats.empty_text += 1,
            InsertOutcome::Duplicate => {
                self.stats.duplicates += 1;
                debug!(
                    source_id,
                    id = id_for_log.as_deref().unwrap_or_default(),
                    "dropping duplicate id; first occurrence kept"
                );
            }
        }
    }

    /// Finish the run, returning the collection and its counters.
    pub fn finish(self) -> (MergedCollection, MergeStats) {
        info!(
            accepted = self.stats.accepted,
            duplicates = self.stats.duplicates,
            empty_text = self.stats.empty_text,
            missing_id = self.stats.missing_id,
            malformed_lines = self.stats.malformed_lines,
            sources_missing = self.stats.sources_missing,
            "loaded {} unique documents",
            self.collection.len()
        );
        (self.collection, self.stats)
    }
}

/// Merge `sources` in order.
pub fn merge_sources(sources: &[Box<dyn RecordSource>]) -> (MergedCollection, MergeStats) {
    let mut merger = Merger::new();
    for source in sources {
        merger.ingest_source(source.as_ref());
    }
    merger.finish()
}

/// Merge every configured file under the configured data directory.
///
/// Missing or malformed files degrade the result instead of failing it; only
/// an invalid configuration is an error.
pub fn load_dataset(config: &MergeConfig) -> Result<(MergedCollection, MergeStats), MergeError> {
    config.validate()?;
    if !config.data_dir.is_dir() {
        warn!(
            data_dir = %config.data_dir.display(),
            "data directory does not exist; every source will be missing"
        );
    }
    Ok(merge_sources(&sources_from_config(config)))
}
