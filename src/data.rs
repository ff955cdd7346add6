use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::constants::record::{
    FIELD_AUTHORS, FIELD_ID, FIELD_SOURCE, FIELD_TEXT, FIELD_TITLE, TEXT_SENTINEL_NA,
};
use crate::types::{RecordId, SourceTag};

/// One schema-free document: its metadata and body text.
///
/// Keys keep the order they had in the source line, and keys this crate does
/// not know about survive untouched through merge, filter, and export.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Wrap a parsed JSON value, or `None` when it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field names in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Document id.
    ///
    /// Strings are used as-is and numbers are stringified; any other JSON
    /// type counts as no id.
    pub fn id(&self) -> Option<Cow<'_, str>> {
        match self.fields.get(FIELD_ID)? {
            Value::String(id) => Some(Cow::Borrowed(id.as_str())),
            Value::Number(id) => Some(Cow::Owned(id.to_string())),
            _ => None,
        }
    }

    /// Source tag, when present as a string.
    pub fn source(&self) -> Option<&str> {
        self.fields.get(FIELD_SOURCE).and_then(Value::as_str)
    }

    /// Title, when present as a string.
    pub fn title(&self) -> Option<&str> {
        self.fields.get(FIELD_TITLE).and_then(Value::as_str)
    }

    /// String entries of the author list; empty when absent.
    pub fn authors(&self) -> Vec<&str> {
        self.fields
            .get(FIELD_AUTHORS)
            .and_then(Value::as_array)
            .map(|authors| authors.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Body text, when present as a string.
    pub fn text(&self) -> Option<&str> {
        self.fields.get(FIELD_TEXT).and_then(Value::as_str)
    }

    /// Whether `text` carries content worth keeping.
    ///
    /// Absent, null, empty, and the `"n/a"` placeholder are rejected, as are
    /// other empty JSON values (`false`, `0`, `[]`, `{}`).
    pub fn has_usable_text(&self) -> bool {
        match self.fields.get(FIELD_TEXT) {
            None => false,
            Some(Value::String(text)) => !text.is_empty() && text != TEXT_SENTINEL_NA,
            Some(value) => is_truthy(value),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Result of offering a record to a `MergedCollection`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was stored under its id.
    Inserted,
    /// The record had no usable `id` field.
    MissingId,
    /// A record with the same id is already stored; the stored one is kept.
    Duplicate,
    /// The record's `text` was absent or empty.
    EmptyText,
}

/// Deduplicated, text-filtered documents keyed by id, in insertion order.
///
/// Every key is unique and every stored record has usable text. The key set
/// doubles as the seen-id set: an id is marked seen only when its record is
/// accepted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedCollection {
    records: IndexMap<RecordId, Record>,
}

impl MergedCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `record`; it is stored only if it has an unseen id and usable text.
    pub fn insert(&mut self, record: Record) -> InsertOutcome {
        let Some(id) = record.id() else {
            return InsertOutcome::MissingId;
        };
        if self.records.contains_key(&*id) {
            return InsertOutcome::Duplicate;
        }
        if !record.has_usable_text() {
            return InsertOutcome::EmptyText;
        }
        let id = id.into_owned();
        self.records.insert(id, record);
        InsertOutcome::Inserted
    }

    /// Store a record that already lives in another collection under `id`.
    pub(crate) fn insert_accepted(&mut self, id: RecordId, record: Record) {
        self.records.entry(id).or_insert(record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record stored under `id`.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Whether `id` has been accepted.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Iterate `(id, record)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &Record)> {
        self.records.iter()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.records.keys()
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Number of records per source tag, in first-seen order.
    ///
    /// Records without a string `source` are counted under `None`.
    pub fn source_counts(&self) -> IndexMap<Option<SourceTag>, usize> {
        let mut counts = IndexMap::new();
        for record in self.records.values() {
            *counts
                .entry(record.source().map(str::to_string))
                .or_insert(0) += 1;
        }
        counts
    }
}

impl FromIterator<(RecordId, Record)> for MergedCollection {
    /// Offer each record in order; entries that fail the insert rules are
    /// dropped with a warning.
    fn from_iter<I: IntoIterator<Item = (RecordId, Record)>>(entries: I) -> Self {
        let mut collection = Self::new();
        for (key, record) in entries {
            let outcome = collection.insert(record);
            if outcome != InsertOutcome::Inserted {
                warn!(id = %key, outcome = ?outcome, "dropping collection entry");
            }
        }
        collection
    }
}

impl<'de> Deserialize<'de> for MergedCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = IndexMap::<RecordId, Record>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MergedCollection {
    type Item = (&'a RecordId, &'a Record);
    type IntoIter = indexmap::map::Iter<'a, RecordId, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn accessors_read_known_fields() {
        let doc = record(json!({
            "id": "a1",
            "source": "arxiv",
            "title": "Title",
            "authors": ["Ada", "Grace", 3],
            "text": "body",
            "url": "https://example.org"
        }));
        assert_eq!(doc.id().as_deref(), Some("a1"));
        assert_eq!(doc.source(), Some("arxiv"));
        assert_eq!(doc.title(), Some("Title"));
        assert_eq!(doc.authors(), vec!["Ada", "Grace"]);
        assert_eq!(doc.text(), Some("body"));
        assert_eq!(
            doc.keys().collect::<Vec<_>>(),
            vec!["id", "source", "title", "authors", "text", "url"]
        );
    }

    #[test]
    fn numeric_ids_are_stringified_and_other_types_are_not_ids() {
        assert_eq!(record(json!({"id": 42})).id().as_deref(), Some("42"));
        assert!(record(json!({"id": null})).id().is_none());
        assert!(record(json!({"id": ["x"]})).id().is_none());
        assert!(record(json!({"title": "no id"})).id().is_none());
    }

    #[test]
    fn usable_text_rejects_empty_values_and_placeholder() {
        for text in [json!(null), json!(""), json!("n/a"), json!(0), json!([]), json!({})] {
            let doc = record(json!({"id": "x", "text": text.clone()}));
            assert!(!doc.has_usable_text(), "{text} should not count as text");
        }
        assert!(!record(json!({"id": "x"})).has_usable_text());
        assert!(record(json!({"id": "x", "text": "N/A"})).has_usable_text());
        assert!(record(json!({"id": "x", "text": " "})).has_usable_text());
    }

    #[test]
    fn non_objects_are_not_records() {
        assert!(Record::from_value(json!([1, 2])).is_none());
        assert!(Record::from_value(json!("text")).is_none());
    }

    #[test]
    fn insert_keeps_first_occurrence() {
        let mut collection = MergedCollection::new();
        assert_eq!(
            collection.insert(record(json!({"id": "x1", "text": "hello"}))),
            InsertOutcome::Inserted
        );
        assert_eq!(
            collection.insert(record(json!({"id": "x1", "text": "world"}))),
            InsertOutcome::Duplicate
        );
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("x1").unwrap().text(), Some("hello"));
    }

    #[test]
    fn rejected_text_does_not_mark_id_seen() {
        let mut collection = MergedCollection::new();
        assert_eq!(
            collection.insert(record(json!({"id": "x2", "text": "n/a"}))),
            InsertOutcome::EmptyText
        );
        assert!(!collection.contains("x2"));
        assert_eq!(
            collection.insert(record(json!({"id": "x2", "text": "later body"}))),
            InsertOutcome::Inserted
        );
    }

    #[test]
    fn missing_id_is_reported() {
        let mut collection = MergedCollection::new();
        assert_eq!(
            collection.insert(record(json!({"text": "orphan"}))),
            InsertOutcome::MissingId
        );
        assert!(collection.is_empty());
    }

    #[test]
    fn source_counts_follow_first_seen_order() {
        let mut collection = MergedCollection::new();
        collection.insert(record(json!({"id": "1", "source": "blogs", "text": "a"})));
        collection.insert(record(json!({"id": "2", "source": "arxiv", "text": "b"})));
        collection.insert(record(json!({"id": "3", "source": "blogs", "text": "c"})));
        collection.insert(record(json!({"id": "4", "text": "d"})));

        let counts = collection.source_counts();
        let entries: Vec<_> = counts.iter().collect();
        assert_eq!(
            entries,
            vec![
                (&Some("blogs".to_string()), &2),
                (&Some("arxiv".to_string()), &1),
                (&None, &1),
            ]
        );
    }

    #[test]
    fn deserializing_applies_insert_rules() {
        let collection: MergedCollection = serde_json::from_str(
            r#"{
                "b": {"id": "b", "text": "kept"},
                "skip": {"id": "skip", "text": "n/a"},
                "a": {"id": "a", "text": "also kept"},
                "dup": {"id": "b", "text": "same id as b"}
            }"#,
        )
        .unwrap();
        assert_eq!(collection.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(!collection.contains("skip"));
        assert_eq!(collection.get("b").unwrap().text(), Some("kept"));
    }

    #[test]
    fn serializes_as_id_keyed_object_in_insertion_order() {
        let mut collection = MergedCollection::new();
        collection.insert(record(json!({"id": "b", "text": "second key first"})));
        collection.insert(record(json!({"id": "a", "text": "first key second"})));
        let body = serde_json::to_string(&collection).unwrap();
        assert_eq!(
            body,
            r#"{"b":{"id":"b","text":"second key first"},"a":{"id":"a","text":"first key second"}}"#
        );
    }
}
