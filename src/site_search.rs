/*!
# Site search
Contains the core logic for locating restriction enzyme recognition sites in a
reference sequence. Patterns are matched by IUPAC base-set intersection on the
forward strand; non-palindromic enzymes are additionally matched against their
reverse complement, with all hits reported at forward-strand coordinates.

## Example usage
```rust
use hictools::data_types::restriction_enzyme::RestrictionEnzyme;
use hictools::site_search::scan_chromosome;

let enzyme = RestrictionEnzyme::new("DpnII".to_string(), "GATC").unwrap();
let sites = scan_chromosome(b"AAGATCGGGGGGATCA", &[enzyme]);
let starts: Vec<u64> = sites.iter().map(|s| s.start).collect();
assert_eq!(starts, vec![2, 11]);
```
*/
use indicatif::ParallelProgressIterator;
use log::debug;
use rayon::prelude::*;
use rust_lib_reference_genome::reference_genome::ReferenceGenome;

use crate::data_types::iupac::IupacBase;
use crate::data_types::restriction_enzyme::RestrictionEnzyme;
use crate::util::progress_bar::get_progress_style;

/// A single recognition site on a chromosome, 0-based half-open
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RestrictionSite {
    /// 0-based start of the site
    pub start: u64,
    /// exclusive end of the site
    pub end: u64,
    /// Label of the enzyme that cuts here
    pub label: String,
}

/// All sites found on one chromosome, in coordinate order
#[derive(Clone, Debug)]
pub struct ChromosomeSites {
    /// Chromosome name
    pub chrom: String,
    /// Length of the chromosome in bp
    pub chrom_length: u64,
    /// Sites sorted by (start, label)
    pub sites: Vec<RestrictionSite>,
}

/// Tests a single pattern at a fixed offset in the sequence
fn pattern_matches_at(sequence: &[u8], offset: usize, pattern: &[IupacBase]) -> bool {
    pattern
        .iter()
        .zip(sequence[offset..offset + pattern.len()].iter())
        .all(|(p, &s)| p.matches(s))
}

/// Returns the start offsets of every occurrence of `pattern` in `sequence`.
/// The scan advances one base at a time, so overlapping occurrences are all reported.
fn scan_pattern(sequence: &[u8], pattern: &[IupacBase]) -> Vec<usize> {
    if sequence.len() < pattern.len() {
        return vec![];
    }

    (0..=(sequence.len() - pattern.len()))
        .filter(|&offset| pattern_matches_at(sequence, offset, pattern))
        .collect()
}

/// Finds every recognition site for a set of enzymes on one chromosome sequence.
/// Results are sorted by start coordinate, then enzyme label.
/// # Arguments
/// * `sequence` - the full chromosome sequence; soft-masked (lowercase) bases are fine
/// * `enzymes` - the enzyme set to scan for
pub fn scan_chromosome(sequence: &[u8], enzymes: &[RestrictionEnzyme]) -> Vec<RestrictionSite> {
    let mut sites: Vec<RestrictionSite> = vec![];
    for enzyme in enzymes.iter() {
        let site_len = enzyme.site_len() as u64;
        let mut starts = scan_pattern(sequence, enzyme.forward());
        if !enzyme.is_palindromic() {
            // reverse-strand sites, reported at their forward coordinates
            starts.extend(scan_pattern(sequence, enzyme.reverse()));
            starts.sort_unstable();
            starts.dedup();
        }

        sites.extend(starts.into_iter().map(|start| RestrictionSite {
            start: start as u64,
            end: start as u64 + site_len,
            label: enzyme.label().to_string(),
        }));
    }

    sites.sort_by(|a, b| (a.start, &a.label).cmp(&(b.start, &b.label)));
    sites
}

/// Scans the full reference genome for restriction sites, one rayon task per chromosome.
/// Chromosomes come back in reference order regardless of scheduling.
/// # Arguments
/// * `reference_genome` - the pre-loaded reference genome
/// * `enzymes` - the enzyme set to scan for
pub fn find_restriction_sites(
    reference_genome: &ReferenceGenome,
    enzymes: &[RestrictionEnzyme],
) -> Vec<ChromosomeSites> {
    let chrom_names: Vec<String> = reference_genome.contig_keys().to_vec();
    let style = get_progress_style();
    chrom_names
        .into_par_iter()
        .map(|chrom| {
            let sequence = reference_genome.get_full_chromosome(&chrom);
            let sites = scan_chromosome(sequence, enzymes);
            debug!("{chrom}: {} sites", sites.len());
            ChromosomeSites {
                chrom,
                chrom_length: sequence.len() as u64,
                sites,
            }
        })
        .progress_with_style(style)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::restriction_enzyme::KnownEnzyme;

    fn dpnii() -> RestrictionEnzyme {
        RestrictionEnzyme::from_known(KnownEnzyme::DpnII)
    }

    #[test]
    fn test_simple_scan() {
        let sites = scan_chromosome(b"AAGATCGGATCC", &[dpnii()]);
        assert_eq!(sites.len(), 2);
        assert_eq!((sites[0].start, sites[0].end), (2, 6));
        assert_eq!((sites[1].start, sites[1].end), (7, 11));
        assert_eq!(sites[0].label, "DpnII");
    }

    #[test]
    fn test_soft_masked_scan() {
        // lowercase bases still match
        let sites = scan_chromosome(b"aagatcgg", &[dpnii()]);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].start, 2);
    }

    #[test]
    fn test_ambiguous_reference_base() {
        // N in the reference never matches, even against pattern N
        let hinfi = RestrictionEnzyme::from_known(KnownEnzyme::HinfI);
        assert_eq!(scan_chromosome(b"GACTC", &[hinfi.clone()]).len(), 1);
        assert_eq!(scan_chromosome(b"GANTC", &[hinfi]).len(), 0);
    }

    #[test]
    fn test_overlapping_sites() {
        let enzyme = RestrictionEnzyme::new("custom".to_string(), "AAA").unwrap();
        let sites = scan_chromosome(b"AAAAA", &[enzyme]);
        let starts: Vec<u64> = sites.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn test_reverse_strand_sites() {
        // AAC hits at 0; GTT (its reverse complement) hits at 5
        let enzyme = RestrictionEnzyme::new("custom".to_string(), "AAC").unwrap();
        let sites = scan_chromosome(b"AACGGGTT", &[enzyme]);
        let starts: Vec<u64> = sites.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 5]);
    }

    #[test]
    fn test_palindromic_sites_not_duplicated() {
        let sites = scan_chromosome(b"AAGATCGG", &[dpnii()]);
        assert_eq!(sites.len(), 1);
    }

    #[test]
    fn test_short_chromosome() {
        assert!(scan_chromosome(b"GAT", &[dpnii()]).is_empty());
        assert!(scan_chromosome(b"", &[dpnii()]).is_empty());
    }

    #[test]
    fn test_multi_enzyme_ordering() {
        let enzymes = vec![
            RestrictionEnzyme::from_known(KnownEnzyme::HindIII),
            dpnii(),
        ];
        let sites = scan_chromosome(b"GATCAAGCTTGATC", &enzymes);
        let labels: Vec<&str> = sites.iter().map(|s| s.label.as_str()).collect();
        let starts: Vec<u64> = sites.iter().map(|s| s.start).collect();
        assert_eq!(labels, vec!["DpnII", "HindIII", "DpnII"]);
        assert_eq!(starts, vec![0, 4, 10]);
    }

    #[test]
    fn test_genome_scan_order() {
        let mut reference_genome = ReferenceGenome::empty_reference();
        reference_genome.add_contig("chrA".to_string(), "AAGATCGG").unwrap();
        reference_genome.add_contig("chrB".to_string(), "GGGG").unwrap();
        let results = find_restriction_sites(&reference_genome, &[dpnii()]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chrom, "chrA");
        assert_eq!(results[0].chrom_length, 8);
        assert_eq!(results[0].sites.len(), 1);
        assert_eq!(results[1].chrom, "chrB");
        assert!(results[1].sites.is_empty());
    }
}
