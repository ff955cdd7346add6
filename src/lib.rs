#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Merge configuration types.
pub mod config;
/// Centralized constants for dataset layout, record fields, and inspection.
pub mod constants;
/// Record and merged collection types.
pub mod data;
/// Command-line runner shared by the `docmerge` binary.
pub mod example_apps;
/// JSON export and re-import of merged collections.
pub mod export;
/// Source-tag filtering.
pub mod filter;
/// Diagnostic printing of merged collections.
pub mod inspect;
/// Ordered, deduplicating merge of record sources.
pub mod merge;
/// Record source traits and built-in sources.
pub mod source;
/// Filesystem helpers used by sources and the downloader.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::MergeConfig;
pub use data::{InsertOutcome, MergedCollection, Record};
pub use errors::MergeError;
pub use export::{load_merged, save_merged};
pub use filter::{SourceFilter, filter_by_source};
pub use inspect::explore;
pub use merge::{MergeStats, Merger, load_dataset, merge_sources};
#[cfg(feature = "huggingface")]
pub use source::huggingface::{DatasetDownloadConfig, DownloadReport, download_dataset};
pub use source::{
    InMemorySource, JsonlRecords, JsonlSource, RecordSource, RecordStream, read_jsonl,
};
pub use types::{DatasetId, RecordId, SourceFileName, SourceId, SourceTag};
