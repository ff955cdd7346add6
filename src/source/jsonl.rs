use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::data::Record;
use crate::errors::MergeError;
use crate::source::{RecordSource, RecordStream};
use crate::types::SourceId;

/// Lazy record iterator over one JSON-lines stream.
///
/// Yields one `Record` per non-blank line. Lines that are not valid JSON
/// objects are logged and skipped; a read error ends the stream. Lines are
/// read as bytes so invalid UTF-8 only costs the offending line.
pub struct JsonlRecords<R = BufReader<File>> {
    source_id: SourceId,
    reader: Option<R>,
    buffer: Vec<u8>,
    line_number: usize,
    malformed_lines: usize,
}

impl JsonlRecords<BufReader<File>> {
    /// Open `path` for reading.
    ///
    /// Fails with `SourceUnavailable` when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MergeError> {
        let path = path.as_ref();
        let source_id = source_id_for_path(path);
        let file = File::open(path).map_err(|err| MergeError::SourceUnavailable {
            source_id: source_id.clone(),
            reason: format!("failed opening {}: {err}", path.display()),
        })?;
        Ok(Self::from_reader(source_id, BufReader::new(file)))
    }
}

impl<R: BufRead> JsonlRecords<R> {
    /// Read records from any buffered reader, labelled `source_id` in logs.
    pub fn from_reader(source_id: impl Into<SourceId>, reader: R) -> Self {
        Self {
            source_id: source_id.into(),
            reader: Some(reader),
            buffer: Vec::new(),
            line_number: 0,
            malformed_lines: 0,
        }
    }

    /// A stream that yields nothing.
    pub fn empty(source_id: impl Into<SourceId>) -> Self {
        Self {
            source_id: source_id.into(),
            reader: None,
            buffer: Vec::new(),
            line_number: 0,
            malformed_lines: 0,
        }
    }

    /// Source label used in diagnostics.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Lines consumed so far, blank and malformed ones included.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Lines skipped so far because they did not parse as a JSON object.
    pub fn malformed_lines(&self) -> usize {
        self.malformed_lines
    }
}

impl<R: BufRead> Iterator for JsonlRecords<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let reader = self.reader.as_mut()?;
            self.buffer.clear();
            match reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(
                        source_id = %self.source_id,
                        line = self.line_number + 1,
                        error = %err,
                        "read failed; ending source early"
                    );
                    self.reader = None;
                    return None;
                }
            }
            self.line_number += 1;

            let line = self.buffer.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<Value>(line) {
                Ok(value) => {
                    if let Some(record) = Record::from_value(value) {
                        return Some(record);
                    }
                    self.malformed_lines += 1;
                    warn!(
                        source_id = %self.source_id,
                        line = self.line_number,
                        error = "line is not a JSON object",
                        "skipping malformed JSON-lines record"
                    );
                }
                Err(err) => {
                    self.malformed_lines += 1;
                    warn!(
                        source_id = %self.source_id,
                        line = self.line_number,
                        error = %err,
                        "skipping malformed JSON-lines record"
                    );
                }
            }
        }
    }
}

impl<R: BufRead> RecordStream for JsonlRecords<R> {
    fn malformed_lines(&self) -> usize {
        self.malformed_lines
    }
}

/// Read a JSON-lines file, treating a missing or unreadable file as empty.
///
/// The failure is logged as a warning and the returned stream yields nothing.
pub fn read_jsonl(path: impl AsRef<Path>) -> JsonlRecords {
    let path = path.as_ref();
    match JsonlRecords::open(path) {
        Ok(records) => records,
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "source file not found; reading nothing"
            );
            JsonlRecords::empty(source_id_for_path(path))
        }
    }
}

/// File-backed `RecordSource` for one JSON-lines file.
#[derive(Clone, Debug)]
pub struct JsonlSource {
    id: SourceId,
    path: PathBuf,
}

impl JsonlSource {
    /// Create a source for `path`, identified by its file name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: source_id_for_path(&path),
            path,
        }
    }
}

impl RecordSource for JsonlSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> Result<Box<dyn RecordStream + '_>, MergeError> {
        Ok(Box::new(JsonlRecords::open(&self.path)?))
    }
}

fn source_id_for_path(path: &Path) -> SourceId {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn records_from(body: &[u8]) -> JsonlRecords<Cursor<Vec<u8>>> {
        JsonlRecords::from_reader("fixture.jsonl", Cursor::new(body.to_vec()))
    }

    #[test]
    fn yields_one_record_per_non_blank_line() {
        let mut stream = records_from(
            b"{\"id\":\"a\",\"text\":\"one\"}\n\n   \n{\"id\":\"b\",\"text\":\"two\"}",
        );
        let ids: Vec<_> = stream
            .by_ref()
            .map(|record| record.id().unwrap().into_owned())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(stream.lines_read(), 4);
        assert_eq!(stream.malformed_lines(), 0);
    }

    #[test]
    fn malformed_line_is_skipped_and_stream_continues() {
        let mut stream = records_from(b"{\"id\":\n{\"id\":\"ok\",\"text\":\"fine\"}\n");
        let records: Vec<_> = stream.by_ref().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id().as_deref(), Some("ok"));
        assert_eq!(stream.malformed_lines(), 1);
    }

    #[test]
    fn non_object_lines_count_as_malformed() {
        let mut stream = records_from(b"[1,2]\n42\n{\"id\":\"x\"}\n");
        assert_eq!(stream.by_ref().count(), 1);
        assert_eq!(stream.malformed_lines(), 2);
    }

    #[test]
    fn invalid_utf8_costs_only_its_line() {
        let mut body = b"{\"id\":\"bad\",\"text\":\"".to_vec();
        body.extend_from_slice(&[0xff, 0xfe]);
        body.extend_from_slice(b"\"}\n{\"id\":\"good\",\"text\":\"ok\"}\n");
        let mut stream = records_from(&body);
        let records: Vec<_> = stream.by_ref().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id().as_deref(), Some("good"));
        assert_eq!(stream.malformed_lines(), 1);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let stream =
            records_from(b"{\"id\":\"a\",\"text\":\"x\"}\r\n{\"id\":\"b\",\"text\":\"y\"}\r\n");
        assert_eq!(stream.count(), 2);
    }

    #[test]
    fn open_reports_missing_file() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("absent.jsonl");
        match JsonlRecords::open(&missing) {
            Err(MergeError::SourceUnavailable { source_id, .. }) => {
                assert_eq!(source_id, "absent.jsonl");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("missing file should not open"),
        }
    }

    #[test]
    fn read_jsonl_treats_missing_file_as_empty() {
        let temp = tempdir().unwrap();
        let stream = read_jsonl(temp.path().join("absent.jsonl"));
        assert_eq!(stream.source_id(), "absent.jsonl");
        assert_eq!(stream.count(), 0);
    }

    #[test]
    fn jsonl_source_reads_file_from_disk() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("arxiv.jsonl");
        std::fs::write(&path, "{\"id\":\"a\",\"source\":\"arxiv\",\"text\":\"t\"}\n").unwrap();

        let source = JsonlSource::new(&path);
        assert_eq!(source.id(), "arxiv.jsonl");
        let records: Vec<_> = source.open().unwrap().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source(), Some("arxiv"));
    }
}
