use std::env;
use std::path::PathBuf;

use crate::constants::dataset::{DATA_DIR_ENV, DEFAULT_DATA_DIR};
use crate::constants::sources::KNOWN_SOURCE_FILES;
use crate::errors::MergeError;
use crate::types::SourceFileName;

/// Where and what to merge.
#[derive(Clone, Debug)]
pub struct MergeConfig {
    /// Directory holding the JSON-lines source files.
    pub data_dir: PathBuf,
    /// Source file names relative to `data_dir`, in merge order.
    ///
    /// Order matters: when an id appears in several files, the record from
    /// the earliest file wins.
    pub source_files: Vec<SourceFileName>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl MergeConfig {
    /// Create a config for `data_dir` with the known source file list.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            source_files: KNOWN_SOURCE_FILES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Replace the source file list.
    pub fn with_source_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceFileName>,
    {
        self.source_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Check that every configured entry names a plain file.
    pub fn validate(&self) -> Result<(), MergeError> {
        for name in &self.source_files {
            if name.trim().is_empty() {
                return Err(MergeError::Configuration(
                    "source file list contains an empty entry".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Absolute-or-relative path of every configured source, in order.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.source_files
            .iter()
            .map(|name| self.data_dir.join(name))
            .collect()
    }
}

/// Resolve the data directory by explicit arg, then environment, then default.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    match env::var(DATA_DIR_ENV) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}
