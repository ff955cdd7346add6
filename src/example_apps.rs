use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::{MergeConfig, resolve_data_dir};
use crate::constants::cli::DEFAULT_FILTER_TAGS;
use crate::constants::dataset::DEFAULT_DATASET_ID;
use crate::constants::inspect::DEFAULT_SAMPLE_COUNT;
use crate::export::save_merged;
use crate::filter::{SourceFilter, filter_by_source};
use crate::inspect::{explore, write_source_breakdown};
use crate::merge::load_dataset;
use crate::transport::fs::unlisted_sources;

#[derive(Debug, Parser)]
#[command(
    name = "docmerge",
    disable_help_subcommand = true,
    about = "Merge the alignment research dataset into one id-keyed collection",
    long_about = "Load the per-source JSON-lines files of the alignment research dataset, deduplicate them by id, drop records without text, print a structural overview, and show per-source filters.",
    after_help = "The data directory is resolved in order by --data-dir, the DOCMERGE_DATA_DIR environment variable, then ./alignment-research-dataset."
)]
struct MergeDemoCli {
    #[arg(
        long = "data-dir",
        value_name = "PATH",
        help = "Directory holding the JSON-lines source files"
    )]
    data_dir: Option<PathBuf>,
    #[arg(long, help = "Download the dataset from the Hugging Face hub before merging")]
    download: bool,
    #[arg(
        long,
        value_name = "ID",
        default_value = DEFAULT_DATASET_ID,
        help = "Hugging Face dataset id used by --download"
    )]
    dataset: String,
    #[arg(
        long,
        default_value_t = DEFAULT_SAMPLE_COUNT,
        help = "Number of sample documents to print"
    )]
    samples: usize,
    #[arg(
        long = "source",
        value_name = "TAG",
        help = "Source tag to filter by, repeat as needed; each tag is filtered separately"
    )]
    sources: Vec<String>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Optional path to save the merged collection as JSON"
    )]
    output: Option<PathBuf>,
    #[arg(long, help = "Print the number of documents per source")]
    breakdown: bool,
}

/// Run the download, load, explore, filter, and export flow.
///
/// `args_iter` excludes the program name.
pub fn run_merge_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let Some(cli) =
        parse_cli::<MergeDemoCli, _>(std::iter::once("docmerge".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let data_dir = resolve_data_dir(cli.data_dir);
    if cli.download {
        download(&cli.dataset, &data_dir)?;
    }

    let config = MergeConfig::new(&data_dir);
    for extra in unlisted_sources(&config) {
        warn!(
            path = %extra.display(),
            "JSON-lines file in data directory is not in the source list; ignoring"
        );
    }

    let (merged, _stats) = load_dataset(&config)?;
    explore(&merged, cli.samples)?;
    if cli.breakdown {
        write_source_breakdown(&merged, &mut std::io::stdout().lock())?;
    }

    let tags: Vec<String> = if cli.sources.is_empty() {
        DEFAULT_FILTER_TAGS.iter().map(|tag| tag.to_string()).collect()
    } else {
        cli.sources
    };
    println!();
    for tag in tags {
        let filtered = filter_by_source(&merged, &SourceFilter::only([tag.as_str()]));
        println!("{tag}: {} documents", filtered.len());
    }

    if let Some(output) = cli.output {
        save_merged(&merged, &output)?;
        println!("Saved merged dataset to {}", output.display());
    }
    Ok(())
}

#[cfg(feature = "huggingface")]
fn download(dataset: &str, data_dir: &std::path::Path) -> Result<(), Box<dyn Error>> {
    use crate::source::huggingface::{DatasetDownloadConfig, download_dataset};

    let mut config = DatasetDownloadConfig::new(data_dir);
    config.dataset = dataset.to_string();
    let report = download_dataset(&config)?;
    println!("Dataset downloaded to: {}", report.local_dir.display());
    Ok(())
}

#[cfg(not(feature = "huggingface"))]
fn download(_dataset: &str, _data_dir: &std::path::Path) -> Result<(), Box<dyn Error>> {
    Err("--download requires the `huggingface` feature".into())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
