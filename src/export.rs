use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::data::MergedCollection;
use crate::errors::MergeError;

/// Write `collection` to `path` as one pretty-printed JSON object.
///
/// Keys are ids in insertion order; output is UTF-8 with two-space indents
/// and non-ASCII text kept literal. An existing file is overwritten.
pub fn save_merged(
    collection: &MergedCollection,
    path: impl AsRef<Path>,
) -> Result<(), MergeError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, collection)?;
    writer.flush()?;
    info!(path = %path.display(), documents = collection.len(), "saved merged dataset");
    Ok(())
}

/// Read a document written by `save_merged` back into a collection.
///
/// Records pass through the usual insert rules, so entries without an id or
/// usable text are dropped with a warning.
pub fn load_merged(path: impl AsRef<Path>) -> Result<MergedCollection, MergeError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let collection: MergedCollection = serde_json::from_reader(reader)?;
    info!(path = %path.display(), documents = collection.len(), "loaded merged dataset");
    Ok(collection)
}
