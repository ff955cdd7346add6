use std::path::{Path, PathBuf};
use std::time::Instant;

use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use tracing::{info, warn};

use crate::constants::dataset::{
    DEFAULT_DATA_DIR, DEFAULT_DATASET_ID, DEFAULT_REVISION, DOWNLOAD_RETRIES,
};
use crate::constants::sources::{JSONL_EXTENSION, KNOWN_SOURCE_FILES};
use crate::errors::MergeError;
use crate::transport::fs::materialize_file;
use crate::types::{DatasetId, SourceFileName};

/// What to fetch from the Hugging Face hub and where to put it.
#[derive(Clone, Debug)]
pub struct DatasetDownloadConfig {
    /// Dataset repository id, e.g. `StampyAI/alignment-research-dataset`.
    pub dataset: DatasetId,
    /// Branch, tag, or commit to fetch.
    pub revision: String,
    /// Directory the files are materialized into.
    pub local_dir: PathBuf,
    /// File names to fetch. Empty means every file with an accepted extension.
    pub file_names: Vec<SourceFileName>,
    /// Extensions accepted when `file_names` is empty.
    pub extensions: Vec<String>,
    /// Hub access token; `None` downloads anonymously.
    pub token: Option<String>,
    /// Whether the hub client shows progress bars.
    pub progress: bool,
}

impl Default for DatasetDownloadConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET_ID.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            local_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_names: KNOWN_SOURCE_FILES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            extensions: vec![JSONL_EXTENSION.to_string()],
            token: None,
            progress: true,
        }
    }
}

impl DatasetDownloadConfig {
    /// Default dataset and file list, materialized into `local_dir`.
    pub fn new(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            ..Self::default()
        }
    }
}

/// Outcome of a dataset download.
#[derive(Clone, Debug, Default)]
pub struct DownloadReport {
    /// Directory the files were placed in.
    pub local_dir: PathBuf,
    /// Files copied into `local_dir` by this run.
    pub downloaded: Vec<PathBuf>,
    /// Files already present with identical contents.
    pub reused: Vec<PathBuf>,
    /// Requested names the repository does not contain.
    pub missing_remote: Vec<SourceFileName>,
}

/// A remote file and the path, relative to the local dir, it lands at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedFile {
    /// Repository-relative file name.
    pub remote_path: String,
    /// Target path relative to the local dir.
    pub local_path: PathBuf,
}

/// Fetch the configured dataset files into `config.local_dir`.
///
/// Requested files the repository lacks are reported and warned about, not
/// treated as errors; the merge later counts them as missing sources.
pub fn download_dataset(config: &DatasetDownloadConfig) -> Result<DownloadReport, MergeError> {
    let start = Instant::now();
    let repo_api = repo_api(config)?;

    info!(
        "[docmerge:hf] reading remote file list for dataset {}",
        config.dataset
    );
    let listing = repo_api.info().map_err(|err| {
        unavailable(
            config,
            format!("failed reading hf-hub repository info: {err}"),
        )
    })?;
    let remote_files: Vec<String> = listing
        .siblings
        .into_iter()
        .map(|sibling| sibling.rfilename)
        .collect();

    let (plan, missing_remote) = plan_downloads(config, &remote_files);
    for name in &missing_remote {
        warn!(
            "[docmerge:hf] requested file {} not found in dataset {}",
            name, config.dataset
        );
    }

    let mut report = DownloadReport {
        local_dir: config.local_dir.clone(),
        missing_remote,
        ..DownloadReport::default()
    };
    let total = plan.len();
    for (ordinal, planned) in plan.into_iter().enumerate() {
        info!(
            "[docmerge:hf] fetching file {}/{}: {}",
            ordinal + 1,
            total,
            planned.remote_path
        );
        let cached = repo_api.get(&planned.remote_path).map_err(|err| {
            unavailable(
                config,
                format!("failed downloading '{}' from hf-hub: {err}", planned.remote_path),
            )
        })?;
        let target = config.local_dir.join(&planned.local_path);
        if materialize_file(&cached, &target)? {
            report.downloaded.push(target);
        } else {
            report.reused.push(target);
        }
    }

    info!(
        "[docmerge:hf] dataset ready in {:.2}s at {} (downloaded={}, reused={}, missing={})",
        start.elapsed().as_secs_f64(),
        config.local_dir.display(),
        report.downloaded.len(),
        report.reused.len(),
        report.missing_remote.len()
    );
    Ok(report)
}

/// Decide which remote files to fetch and where each lands.
///
/// With an explicit file list, a remote file matches a requested name by its
/// full repository path or by its final path component, and lands at the
/// requested name so the merger finds it directly under the local dir.
/// Without one, every file with an accepted extension is fetched at its
/// repository path. Returns the plan and the requested names left unmatched.
pub fn plan_downloads(
    config: &DatasetDownloadConfig,
    remote_files: &[String],
) -> (Vec<PlannedFile>, Vec<SourceFileName>) {
    if config.file_names.is_empty() {
        let accepted: Vec<String> = config
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        let mut plan: Vec<PlannedFile> = remote_files
            .iter()
            .filter(|remote| {
                Path::new(remote.as_str())
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        accepted
                            .iter()
                            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
                    })
            })
            .map(|remote| PlannedFile {
                remote_path: remote.clone(),
                local_path: PathBuf::from(remote),
            })
            .collect();
        plan.sort_by(|a, b| a.remote_path.cmp(&b.remote_path));
        return (plan, Vec::new());
    }

    let mut plan = Vec::new();
    let mut missing = Vec::new();
    for name in &config.file_names {
        let exact = remote_files.iter().find(|remote| *remote == name);
        let by_file_name = || {
            remote_files.iter().find(|remote| {
                Path::new(remote.as_str())
                    .file_name()
                    .is_some_and(|file_name| file_name == name.as_str())
            })
        };
        match exact.or_else(by_file_name) {
            Some(remote) => plan.push(PlannedFile {
                remote_path: remote.clone(),
                local_path: PathBuf::from(name),
            }),
            None => missing.push(name.clone()),
        }
    }
    (plan, missing)
}

fn repo_api(config: &DatasetDownloadConfig) -> Result<ApiRepo, MergeError> {
    let api = ApiBuilder::new()
        .with_progress(config.progress)
        .with_retries(DOWNLOAD_RETRIES)
        .with_token(config.token.clone())
        .build()
        .map_err(|err| unavailable(config, format!("failed building hf-hub client: {err}")))?;
    Ok(api.repo(Repo::with_revision(
        config.dataset.clone(),
        RepoType::Dataset,
        config.revision.clone(),
    )))
}

fn unavailable(config: &DatasetDownloadConfig, reason: String) -> MergeError {
    MergeError::SourceUnavailable {
        source_id: config.dataset.clone(),
        reason,
    }
}
