//! Diagnostic printing of a merged collection.

use std::io::{self, Write};

use crate::constants::inspect::{MISSING_FIELD, TEXT_PREVIEW_CHARS};
use crate::data::{MergedCollection, Record};

/// Print the collection summary and `samples` records to stdout.
pub fn explore(collection: &MergedCollection, samples: usize) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_summary(collection, samples, &mut out)
}

/// Write the total count, then details for the first `samples` records.
pub fn write_summary<W: Write>(
    collection: &MergedCollection,
    samples: usize,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "\n=== Dataset Structure ===")?;
    writeln!(out, "Total documents: {}", collection.len())?;

    for (idx, (id, record)) in collection.iter().take(samples).enumerate() {
        writeln!(out, "\n--- Sample Document {} ---", idx + 1)?;
        write_record(id, record, out)?;
    }
    Ok(())
}

fn write_record<W: Write>(id: &str, record: &Record, out: &mut W) -> io::Result<()> {
    let text = record.text().unwrap_or_default();
    writeln!(out, "ID: {id}")?;
    writeln!(out, "Source: {}", record.source().unwrap_or(MISSING_FIELD))?;
    writeln!(out, "Title: {}", record.title().unwrap_or(MISSING_FIELD))?;
    writeln!(out, "Text length: {}", text.chars().count())?;
    writeln!(out, "Authors: {:?}", record.authors())?;
    writeln!(out, "Available keys: {:?}", record.keys().collect::<Vec<_>>())?;
    if !text.is_empty() {
        writeln!(out, "Text preview: {}...", preview(text, TEXT_PREVIEW_CHARS))?;
    }
    Ok(())
}

/// Leading `max_chars` characters of `text`, cut on a char boundary.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Write the number of records per source tag.
pub fn write_source_breakdown<W: Write>(
    collection: &MergedCollection,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "\n=== Documents per source ===")?;
    for (source, count) in collection.source_counts() {
        writeln!(
            out,
            "{:<20} {count}",
            source.as_deref().unwrap_or(MISSING_FIELD)
        )?;
    }
    Ok(())
}
