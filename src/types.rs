/// Unique document identifier, the key of a merged collection.
/// Example: `arxiv_2101.00001`
pub type RecordId = String;
/// Identifier for the source that produced a record stream.
/// Examples: `arxiv.jsonl`, `in_memory_fixture`
pub type SourceId = String;
/// Value of a record's `source` field.
/// Examples: `arxiv`, `lesswrong`, `alignmentforum`
pub type SourceTag = String;
/// File name of a JSON-lines source inside the data directory.
/// Example: `aisafety.info.jsonl`
pub type SourceFileName = String;
/// Hugging Face dataset repository id.
/// Example: `StampyAI/alignment-research-dataset`
pub type DatasetId = String;
