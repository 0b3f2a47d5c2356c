use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::site_search::ChromosomeSites;

/// Label used for the per-chromosome rollup row in multi-enzyme runs
pub const COMBINED_LABEL: &str = "combined";

/// This is a wrapper for writing the per-chromosome digest summary to a file
pub struct SiteSummaryWriter {
    /// Handle on the writer
    csv_writer: csv::Writer<File>,
}

/// Contains all the data written to each row of our summary file
#[derive(Serialize)]
struct SiteSummaryRow {
    /// Chromosome name
    chrom: String,
    /// Enzyme label, or "combined" for the rollup row
    enzyme: String,
    /// Number of recognition sites found
    site_count: u64,
    /// Chromosome length in bp
    chrom_length: u64,
    /// Site density, in sites per megabase
    sites_per_mb: f64,
    /// Mean digest fragment length implied by the cut density
    mean_fragment_length: f64,
}

impl SiteSummaryRow {
    /// Creates a new row from a chromosome, a label, and a site count
    fn new(chrom_sites: &ChromosomeSites, enzyme: String, site_count: u64) -> Self {
        // n cuts partition the chromosome into n+1 fragments
        let mean_fragment_length = chrom_sites.chrom_length as f64 / (site_count + 1) as f64;
        let sites_per_mb = if chrom_sites.chrom_length == 0 {
            0.0
        } else {
            site_count as f64 * 1e6 / chrom_sites.chrom_length as f64
        };
        Self {
            chrom: chrom_sites.chrom.clone(),
            enzyme,
            site_count,
            chrom_length: chrom_sites.chrom_length,
            sites_per_mb,
            mean_fragment_length,
        }
    }
}

impl SiteSummaryWriter {
    /// Creates a new writer to accumulate the summary
    /// # Arguments
    /// * `filename` - path to the filename that will get opened, must be .csv/.tsv
    pub fn new(filename: &Path) -> csv::Result<Self> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;
        Ok(Self { csv_writer })
    }

    /// Writes the summary rows for one chromosome: one row per enzyme label, plus a
    /// rollup row when the digest uses more than one enzyme.
    /// # Arguments
    /// * `chrom_sites` - the scanned sites for the chromosome
    /// * `labels` - the enzyme labels, in configuration order
    pub fn write_chromosome(&mut self, chrom_sites: &ChromosomeSites, labels: &[String]) -> csv::Result<()> {
        for label in labels.iter() {
            let site_count = chrom_sites.sites.iter()
                .filter(|s| &s.label == label)
                .count() as u64;
            let row = SiteSummaryRow::new(chrom_sites, label.clone(), site_count);
            self.csv_writer.serialize(&row)?;
        }

        if labels.len() > 1 {
            let row = SiteSummaryRow::new(
                chrom_sites, COMBINED_LABEL.to_string(), chrom_sites.sites.len() as u64
            );
            self.csv_writer.serialize(&row)?;
        }

        Ok(())
    }

    /// Flushes and closes the output file
    pub fn finish(mut self) -> csv::Result<()> {
        self.csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site_search::RestrictionSite;

    #[test]
    fn test_summary_rows() {
        let chrom_sites = ChromosomeSites {
            chrom: "chr1".to_string(),
            chrom_length: 1_000_000,
            sites: vec![
                RestrictionSite { start: 10, end: 14, label: "DpnII".to_string() },
                RestrictionSite { start: 500, end: 504, label: "DpnII".to_string() },
                RestrictionSite { start: 900, end: 906, label: "HindIII".to_string() },
            ],
        };
        let labels = vec!["DpnII".to_string(), "HindIII".to_string()];

        let out_file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        let mut writer = SiteSummaryWriter::new(out_file.path()).unwrap();
        writer.write_chromosome(&chrom_sites, &labels).unwrap();
        writer.finish().unwrap();

        let contents = std::fs::read_to_string(out_file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4); // header + 2 enzymes + combined
        assert!(lines[0].starts_with("chrom\tenzyme\tsite_count"));
        assert!(lines[1].starts_with("chr1\tDpnII\t2\t1000000\t2"));
        assert!(lines[2].starts_with("chr1\tHindIII\t1\t1000000\t1"));
        assert!(lines[3].starts_with("chr1\tcombined\t3\t1000000\t3"));
    }
}
