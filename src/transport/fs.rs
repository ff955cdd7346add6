use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::MergeConfig;
use crate::constants::sources::JSONL_EXTENSION;
use crate::errors::MergeError;

/// Whether `path` carries the JSON-lines extension.
pub fn is_jsonl_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(JSONL_EXTENSION))
}

/// JSON-lines files anywhere under `root`, sorted by path.
///
/// A missing root yields an empty list.
pub fn list_jsonl_files(root: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_jsonl_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// JSON-lines files in the data directory that the config does not merge.
///
/// Paths are returned relative to `config.data_dir`.
pub fn unlisted_sources(config: &MergeConfig) -> Vec<PathBuf> {
    let listed: HashSet<&Path> = config
        .source_files
        .iter()
        .map(|name| Path::new(name.as_str()))
        .collect();
    list_jsonl_files(&config.data_dir)
        .into_iter()
        .filter_map(|path| {
            path.strip_prefix(&config.data_dir)
                .ok()
                .map(Path::to_path_buf)
        })
        .filter(|relative| !listed.contains(relative.as_path()))
        .collect()
}

/// Copy `source_path` to `target_path`, creating parent directories.
///
/// Returns `false` without copying when the target already holds the same
/// bytes, `true` when the file was (re)written.
pub fn materialize_file(source_path: &Path, target_path: &Path) -> Result<bool, MergeError> {
    let resolved_source =
        fs::canonicalize(source_path).unwrap_or_else(|_| source_path.to_path_buf());

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)?;
    }

    if target_path.exists() {
        let src_meta = fs::metadata(&resolved_source)?;
        let dst_meta = fs::metadata(target_path)?;
        if src_meta.len() == dst_meta.len() && same_contents(&resolved_source, target_path)? {
            debug!(
                target = %target_path.display(),
                bytes = dst_meta.len(),
                "target already up to date; reusing"
            );
            return Ok(false);
        }
        fs::remove_file(target_path)?;
    }

    fs::copy(&resolved_source, target_path)?;
    Ok(true)
}

/// Byte-for-byte comparison of two files of equal length.
fn same_contents(left: &Path, right: &Path) -> Result<bool, MergeError> {
    let mut left = BufReader::new(File::open(left)?);
    let mut right = BufReader::new(File::open(right)?);
    let mut left_buf = [0u8; 8192];
    let mut right_buf = [0u8; 8192];
    loop {
        let read = left.read(&mut left_buf)?;
        if read == 0 {
            let mut tail = [0u8; 1];
            return Ok(right.read(&mut tail)? == 0);
        }
        right.read_exact(&mut right_buf[..read])?;
        if left_buf[..read] != right_buf[..read] {
            return Ok(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_only_jsonl_files_sorted() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("b.jsonl"), "").unwrap();
        fs::write(temp.path().join("a.JSONL"), "").unwrap();
        fs::write(temp.path().join("readme.md"), "").unwrap();
        fs::write(nested.join("c.jsonl"), "").unwrap();

        let files = list_jsonl_files(temp.path());
        assert_eq!(
            files,
            vec![
                temp.path().join("a.JSONL"),
                temp.path().join("b.jsonl"),
                nested.join("c.jsonl"),
            ]
        );
    }

    #[test]
    fn missing_root_lists_nothing() {
        let temp = tempdir().unwrap();
        assert!(list_jsonl_files(temp.path().join("absent")).is_empty());
    }

    #[test]
    fn unlisted_sources_reports_extra_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("arxiv.jsonl"), "").unwrap();
        fs::write(temp.path().join("extra.jsonl"), "").unwrap();

        let config = MergeConfig::new(temp.path()).with_source_files(["arxiv.jsonl"]);
        assert_eq!(unlisted_sources(&config), vec![PathBuf::from("extra.jsonl")]);
    }

    #[test]
    fn materialize_copies_then_skips_identical_target() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("cache").join("blob");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "{\"id\":\"a\"}\n").unwrap();
        let target = temp.path().join("out").join("arxiv.jsonl");

        assert!(materialize_file(&source, &target).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"id\":\"a\"}\n");
        assert!(!materialize_file(&source, &target).unwrap());

        fs::write(&source, "{\"id\":\"longer\"}\n").unwrap();
        assert!(materialize_file(&source, &target).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"id\":\"longer\"}\n");
    }

    #[test]
    fn materialize_rewrites_same_size_different_contents() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("blob");
        let target = temp.path().join("arxiv.jsonl");
        fs::write(&source, "{\"id\":\"b\"}\n").unwrap();
        fs::write(&target, "{\"id\":\"a\"}\n").unwrap();

        assert!(materialize_file(&source, &target).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"id\":\"b\"}\n");
        assert!(!materialize_file(&source, &target).unwrap());
    }
}
