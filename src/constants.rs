/// Constants describing the dataset layout on disk.
pub mod sources {
    /// Source files expected in the data directory, in merge order.
    pub const KNOWN_SOURCE_FILES: [&str; 12] = [
        "agentmodels.jsonl",
        "agisf.jsonl",
        "aisafety.info.jsonl",
        "alignmentforum.jsonl",
        "arbital.jsonl",
        "arxiv.jsonl",
        "blogs.jsonl",
        "distill.jsonl",
        "eaforum.jsonl",
        "lesswrong.jsonl",
        "special_docs.jsonl",
        "youtube.jsonl",
    ];
    /// Extension (without dot) used for JSON-lines source files.
    pub const JSONL_EXTENSION: &str = "jsonl";
}

/// Field names and sentinels of the record schema.
pub mod record {
    /// Unique document identifier field.
    pub const FIELD_ID: &str = "id";
    /// Source tag field.
    pub const FIELD_SOURCE: &str = "source";
    /// Document title field.
    pub const FIELD_TITLE: &str = "title";
    /// Author list field.
    pub const FIELD_AUTHORS: &str = "authors";
    /// Body text field.
    pub const FIELD_TEXT: &str = "text";
    /// Placeholder some sources write instead of a body.
    pub const TEXT_SENTINEL_NA: &str = "n/a";
}

/// Constants used by the diagnostic inspector.
pub mod inspect {
    /// Number of sample records printed when none is requested.
    pub const DEFAULT_SAMPLE_COUNT: usize = 3;
    /// Number of characters shown in a text preview.
    pub const TEXT_PREVIEW_CHARS: usize = 200;
    /// Placeholder printed for absent string fields.
    pub const MISSING_FIELD: &str = "N/A";
}

/// Constants used to locate and acquire the dataset.
pub mod dataset {
    /// Hugging Face dataset repository holding the source files.
    pub const DEFAULT_DATASET_ID: &str = "StampyAI/alignment-research-dataset";
    /// Repository revision downloaded by default.
    pub const DEFAULT_REVISION: &str = "main";
    /// Local directory the dataset is downloaded into and merged from.
    pub const DEFAULT_DATA_DIR: &str = "./alignment-research-dataset";
    /// Environment variable overriding the data directory.
    pub const DATA_DIR_ENV: &str = "DOCMERGE_DATA_DIR";
    /// Retries the hub client performs per file.
    pub const DOWNLOAD_RETRIES: usize = 5;
}

/// Constants used by the command-line runner.
pub mod cli {
    /// Source tags filtered by the demo run when none are given.
    pub const DEFAULT_FILTER_TAGS: [&str; 2] = ["arxiv", "alignmentforum"];
}
