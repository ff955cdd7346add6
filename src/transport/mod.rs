/// Filesystem discovery and file placement helpers.
pub mod fs;
