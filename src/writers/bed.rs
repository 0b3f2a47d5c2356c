use serde::Serialize;
use std::path::Path;

use crate::site_search::ChromosomeSites;
use crate::writers::create_maybe_gzip;

/// One output row, following the BED4 convention
#[derive(Serialize)]
struct BedRecord<'a> {
    /// Chromosome name
    chrom: &'a str,
    /// 0-based start of the site
    start: u64,
    /// exclusive end of the site
    end: u64,
    /// Label of the enzyme that cuts here
    name: &'a str,
}

/// Writes restriction sites as headerless BED4, one chromosome at a time
pub struct BedWriter {
    /// Handle on the writer, which may be gzip-compressed
    csv_writer: csv::Writer<Box<dyn std::io::Write>>,
}

impl BedWriter {
    /// Creates a new BED writer; a ".gz" extension selects gzip output.
    /// # Arguments
    /// * `filename` - path to the output BED file
    /// # Errors
    /// * if the file cannot be created
    pub fn new(filename: &Path) -> anyhow::Result<Self> {
        let csv_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(create_maybe_gzip(filename)?);
        Ok(Self { csv_writer })
    }

    /// Writes all sites for one chromosome; callers provide chromosomes in reference order.
    /// # Arguments
    /// * `chrom_sites` - the scanned sites for the chromosome
    pub fn write_chromosome(&mut self, chrom_sites: &ChromosomeSites) -> csv::Result<()> {
        for site in chrom_sites.sites.iter() {
            self.csv_writer.serialize(BedRecord {
                chrom: &chrom_sites.chrom,
                start: site.start,
                end: site.end,
                name: &site.label,
            })?;
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

    fn example_sites() -> ChromosomeSites {
        ChromosomeSites {
            chrom: "chr1".to_string(),
            chrom_length: 100,
            sites: vec![
                RestrictionSite { start: 2, end: 6, label: "DpnII".to_string() },
                RestrictionSite { start: 40, end: 46, label: "HindIII".to_string() },
            ],
        }
    }

    #[test]
    fn test_bed_output() {
        let out_file = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
        let mut writer = BedWriter::new(out_file.path()).unwrap();
        writer.write_chromosome(&example_sites()).unwrap();
        writer.finish().unwrap();

        let contents = std::fs::read_to_string(out_file.path()).unwrap();
        assert_eq!(contents, "chr1\t2\t6\tDpnII\nchr1\t40\t46\tHindIII\n");
    }

    #[test]
    fn test_gzip_bed_output() {
        let out_file = tempfile::Builder::new().suffix(".bed.gz").tempfile().unwrap();
        let mut writer = BedWriter::new(out_file.path()).unwrap();
        writer.write_chromosome(&example_sites()).unwrap();
        writer.finish().unwrap();

        let mut decoder = flate2::read::MultiGzDecoder::new(std::fs::File::open(out_file.path()).unwrap());
        let mut contents = String::new();
        std::io::Read::read_to_string(&mut decoder, &mut contents).unwrap();
        assert_eq!(contents, "chr1\t2\t6\tDpnII\nchr1\t40\t46\tHindIII\n");
    }
}
