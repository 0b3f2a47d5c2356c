use anyhow::Context;
use serde::Serialize;
use std::path::Path;

use crate::data_types::contact_matrix::ContactMatrix;
use crate::writers::create_maybe_gzip;

/// One row of the output bin table
#[derive(Serialize)]
struct BinRow<'a> {
    chrom: &'a str,
    start: u64,
    end: u64,
    coverage: f64,
}

/// One row of the output counts file
#[derive(Serialize)]
struct CountRow {
    bin1: u32,
    bin2: u32,
    value: f64,
}

/// Saves a contact matrix as its bin table and counts files.
/// Counts come out sorted by (bin1, bin2) so the output is deterministic; a ".gz"
/// extension on either path selects gzip output.
/// # Arguments
/// * `matrix` - the matrix to save
/// * `bins_fn` - path for the bin table
/// * `matrix_fn` - path for the counts file
/// # Errors
/// * if either file cannot be created or written
pub fn save_contact_matrix(matrix: &ContactMatrix, bins_fn: &Path, matrix_fn: &Path) -> anyhow::Result<()> {
    let mut bin_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(create_maybe_gzip(bins_fn)?);
    for bin in matrix.bins().iter() {
        bin_writer.serialize(BinRow {
            chrom: &bin.chrom,
            start: bin.start,
            end: bin.end,
            coverage: bin.coverage,
        }).with_context(|| format!("Error while writing {bins_fn:?}:"))?;
    }
    bin_writer.flush()
        .with_context(|| format!("Error while flushing output to {bins_fn:?}:"))?;
    drop(bin_writer);

    let mut count_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(create_maybe_gzip(matrix_fn)?);
    for (bin1, bin2, value) in matrix.sorted_triplets() {
        count_writer.serialize(CountRow { bin1, bin2, value })
            .with_context(|| format!("Error while writing {matrix_fn:?}:"))?;
    }
    count_writer.flush()
        .with_context(|| format!("Error while flushing output to {matrix_fn:?}:"))?;

    Ok(())
}
