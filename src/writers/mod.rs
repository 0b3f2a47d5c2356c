/*!
# Writers module
Contains the logic for writing the output files for the find-sites and merge-bins commands.
*/
/// Generates the BED file of restriction sites
pub mod bed;
/// Writes the text representation of a contact matrix
pub mod matrix_text;
/// Generates the per-chromosome site summary report
pub mod site_summary;

use anyhow::Context;
use std::fs::File;
use std::path::Path;

/// Creates a plain or gzipped output file based on the extension
pub(crate) fn create_maybe_gzip(filename: &Path) -> anyhow::Result<Box<dyn std::io::Write>> {
    let handle = File::create(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;
    if filename.extension().unwrap_or_default() == "gz" {
        Ok(Box::new(flate2::write::GzEncoder::new(handle, flate2::Compression::best())))
    } else {
        Ok(Box::new(handle))
    }
}
