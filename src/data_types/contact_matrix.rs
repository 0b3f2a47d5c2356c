use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::ops::Range;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MatrixError {
    #[error("bin table must not be empty")]
    EmptyBins,
    #[error("bin #{index} ({chrom}:{start}-{end}) is out of order within its chromosome")]
    UnsortedBins { index: usize, chrom: String, start: u64, end: u64 },
    #[error("bin #{index} has end <= start")]
    InvalidBinSpan { index: usize },
    #[error("count entry references bin {bin_id}, but only {num_bins} bins are defined")]
    BinIdOutOfRange { bin_id: u32, num_bins: usize },
    #[error("count entry ({bin1}, {bin2}) has a non-finite value")]
    NonFiniteCount { bin1: u32, bin2: u32 },
}

/// A single genomic bin of the contact matrix
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixBin {
    /// Chromosome name
    pub chrom: String,
    /// 0-based inclusive start
    pub start: u64,
    /// exclusive end
    pub end: u64,
    /// Coverage annotation carried through merges as a mean
    pub coverage: f64,
}

impl MatrixBin {
    pub fn new(chrom: String, start: u64, end: u64, coverage: f64) -> Self {
        Self { chrom, start, end, coverage }
    }
}

/// A sparse, symmetric Hi-C contact matrix.
/// Only the upper triangle is stored: every count entry (i, j) satisfies i <= j.
/// The bin table is grouped by chromosome with ascending, non-overlapping intervals.
#[derive(Clone, Debug)]
pub struct ContactMatrix {
    /// The genome-wide bin table, in matrix order
    bins: Vec<MatrixBin>,
    /// Upper-triangle counts, keyed by (bin1, bin2) with bin1 <= bin2
    counts: FxHashMap<(u32, u32), f64>,
}

impl ContactMatrix {
    /// Creates a matrix from a bin table and raw count triplets.
    /// Triplets below the diagonal are mirrored to the upper triangle, and duplicate
    /// entries accumulate.
    /// # Arguments
    /// * `bins` - the bin table, grouped by chromosome in matrix order
    /// * `triplets` - raw (bin1, bin2, value) entries
    /// # Errors
    /// * if the bin table is empty, unsorted, or contains invalid spans
    /// * if a triplet references a missing bin or carries a non-finite value
    pub fn new(bins: Vec<MatrixBin>, triplets: Vec<(u32, u32, f64)>) -> Result<Self, MatrixError> {
        if bins.is_empty() {
            return Err(MatrixError::EmptyBins);
        }
        for (index, pair) in bins.windows(2).enumerate() {
            let (prev, bin) = (&pair[0], &pair[1]);
            if bin.chrom == prev.chrom && bin.start < prev.end {
                return Err(MatrixError::UnsortedBins {
                    index: index + 1,
                    chrom: bin.chrom.clone(),
                    start: bin.start,
                    end: bin.end,
                });
            }
        }
        for (index, bin) in bins.iter().enumerate() {
            if bin.end <= bin.start {
                return Err(MatrixError::InvalidBinSpan { index });
            }
        }

        let num_bins = bins.len();
        let mut counts: FxHashMap<(u32, u32), f64> = Default::default();
        for (bin1, bin2, value) in triplets {
            if bin1 as usize >= num_bins {
                return Err(MatrixError::BinIdOutOfRange { bin_id: bin1, num_bins });
            }
            if bin2 as usize >= num_bins {
                return Err(MatrixError::BinIdOutOfRange { bin_id: bin2, num_bins });
            }
            if !value.is_finite() {
                return Err(MatrixError::NonFiniteCount { bin1, bin2 });
            }

            // normalize to the upper triangle
            let key = (bin1.min(bin2), bin1.max(bin2));
            *counts.entry(key).or_insert(0.0) += value;
        }

        Ok(Self { bins, counts })
    }

    pub fn bins(&self) -> &[MatrixBin] {
        &self.bins
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Raw access to the upper-triangle counts
    pub fn counts(&self) -> &FxHashMap<(u32, u32), f64> {
        &self.counts
    }

    /// Returns the counts as sorted triplets, suitable for deterministic output
    pub fn sorted_triplets(&self) -> Vec<(u32, u32, f64)> {
        self.counts
            .iter()
            .map(|(&(b1, b2), &v)| (b1, b2, v))
            .sorted_by_key(|&(b1, b2, _v)| (b1, b2))
            .collect()
    }

    /// Returns the bin index ranges per chromosome, in matrix order
    pub fn chrom_bin_ranges(&self) -> IndexMap<String, Range<usize>> {
        let mut ranges: IndexMap<String, Range<usize>> = Default::default();
        for (index, bin) in self.bins.iter().enumerate() {
            ranges
                .entry(bin.chrom.clone())
                .and_modify(|r| r.end = index + 1)
                .or_insert(index..index + 1);
        }
        ranges
    }

    /// Sum of each bin's row and column, counting the diagonal once
    pub fn marginals(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.bins.len()];
        for (&(b1, b2), &value) in self.counts.iter() {
            sums[b1 as usize] += value;
            if b1 != b2 {
                sums[b2 as usize] += value;
            }
        }
        sums
    }

    /// Bin indices with a zero marginal, the equivalent of masked-out rows
    pub fn masked_bins(&self) -> Vec<usize> {
        self.marginals()
            .iter()
            .enumerate()
            .filter_map(|(index, &sum)| if sum == 0.0 { Some(index) } else { None })
            .collect()
    }
}
