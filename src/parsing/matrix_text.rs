use anyhow::{anyhow, Context};
use std::fs::File;
use std::path::Path;

use crate::data_types::contact_matrix::{ContactMatrix, MatrixBin};

/// Opens a plain or gzipped file for reading based on the extension
fn open_maybe_gzip(filename: &Path) -> anyhow::Result<Box<dyn std::io::Read>> {
    let handle = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    if filename.extension().unwrap_or_default() == "gz" {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(handle)))
    } else {
        Ok(Box::new(handle))
    }
}

/// Builds a headerless tab-delimited reader that skips '#' comment lines
fn tsv_reader(filename: &Path) -> anyhow::Result<csv::Reader<Box<dyn std::io::Read>>> {
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(open_maybe_gzip(filename)?))
}

/// Loads a bin table from a BED-like TSV: chrom, start, end, and an optional
/// coverage in column 4 (defaults to 0 when absent).
/// # Arguments
/// * `bins_fn` - path to the bin table, optionally gzipped
/// # Errors
/// * if the file does not open or a row is malformed
pub fn load_bins(bins_fn: &Path) -> anyhow::Result<Vec<MatrixBin>> {
    let mut reader = tsv_reader(bins_fn)?;
    let mut bins: Vec<MatrixBin> = vec![];
    for result in reader.records() {
        let row = result.with_context(|| format!("Error while reading {bins_fn:?}"))?;
        let chrom = row.get(0).ok_or(anyhow!("Missing chrom on row: {row:?}"))?;
        let start: u64 = row.get(1)
            .ok_or(anyhow!("Missing start on row: {row:?}"))?
            .parse()
            .with_context(|| format!("Error while parsing start on row: {row:?}"))?;
        let end: u64 = row.get(2)
            .ok_or(anyhow!("Missing end on row: {row:?}"))?
            .parse()
            .with_context(|| format!("Error while parsing end on row: {row:?}"))?;
        let coverage: f64 = match row.get(3) {
            Some(field) => field.parse()
                .with_context(|| format!("Error while parsing coverage on row: {row:?}"))?,
            None => 0.0,
        };
        bins.push(MatrixBin::new(chrom.to_string(), start, end, coverage));
    }
    Ok(bins)
}

/// Loads sparse count triplets from a TSV of `bin1 bin2 value` rows with 0-based indices.
/// # Arguments
/// * `matrix_fn` - path to the counts file, optionally gzipped
/// # Errors
/// * if the file does not open or a row is malformed
pub fn load_counts(matrix_fn: &Path) -> anyhow::Result<Vec<(u32, u32, f64)>> {
    let mut reader = tsv_reader(matrix_fn)?;
    let mut triplets: Vec<(u32, u32, f64)> = vec![];
    for result in reader.records() {
        let row = result.with_context(|| format!("Error while reading {matrix_fn:?}"))?;
        let bin1: u32 = row.get(0)
            .ok_or(anyhow!("Missing bin1 on row: {row:?}"))?
            .parse()
            .with_context(|| format!("Error while parsing bin1 on row: {row:?}"))?;
        let bin2: u32 = row.get(1)
            .ok_or(anyhow!("Missing bin2 on row: {row:?}"))?
            .parse()
            .with_context(|| format!("Error while parsing bin2 on row: {row:?}"))?;
        let value: f64 = row.get(2)
            .ok_or(anyhow!("Missing value on row: {row:?}"))?
            .parse()
            .with_context(|| format!("Error while parsing value on row: {row:?}"))?;
        triplets.push((bin1, bin2, value));
    }
    Ok(triplets)
}

/// Loads and validates a full contact matrix from its bin table and counts files.
/// # Arguments
/// * `bins_fn` - path to the bin table
/// * `matrix_fn` - path to the counts file
/// # Errors
/// * if either file fails to load, or the combination fails matrix validation
pub fn load_contact_matrix(bins_fn: &Path, matrix_fn: &Path) -> anyhow::Result<ContactMatrix> {
    let bins = load_bins(bins_fn)?;
    let triplets = load_counts(matrix_fn)?;
    let matrix = ContactMatrix::new(bins, triplets)
        .with_context(|| format!("Error while validating matrix from {bins_fn:?} and {matrix_fn:?}:"))?;
    Ok(matrix)
}
