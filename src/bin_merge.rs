/*!
# Bin merge
Contains the logic for reducing the resolution of a contact matrix by merging
consecutive bins, plus a running-window variant that smooths counts without
changing the bin table. Counts live on the upper triangle throughout, so the
diagonal is only ever counted once.
*/
use anyhow::ensure;
use derive_builder::Builder;
use indexmap::IndexMap;
use log::warn;
use rustc_hash::FxHashMap;
use std::ops::Range;

use crate::data_types::contact_matrix::{ContactMatrix, MatrixBin};

/// Controls which merge operation runs and how wide it is
#[derive(Builder, Clone, Copy, Debug)]
pub struct MergeConfig {
    /// Number of consecutive bins to merge, or the running window width
    pub num_bins: usize,
    /// If true, smooth with a running window instead of reducing resolution
    #[builder(default = "false")]
    pub running_window: bool,
}

/// Dispatches to the configured merge operation.
/// # Arguments
/// * `matrix` - the input contact matrix
/// * `config` - the merge configuration
/// # Errors
/// * if `num_bins` is zero, or even in running-window mode
pub fn merge_matrix(matrix: &ContactMatrix, config: MergeConfig) -> anyhow::Result<ContactMatrix> {
    if config.running_window {
        running_window_merge(matrix, config.num_bins)
    } else {
        merge_bins(matrix, config.num_bins)
    }
}

/// Partitions the bin table into per-chromosome groups of `num_bins` consecutive bins.
/// A trailing group with fewer than `num_bins / 2` members is dropped with a warning,
/// except at the very end of the table where the remainder is always kept.
fn group_bins(chrom_ranges: &IndexMap<String, Range<usize>>, num_bins: usize) -> Vec<Range<usize>> {
    let mut groups: Vec<Range<usize>> = vec![];
    for (chrom_index, (chrom, range)) in chrom_ranges.iter().enumerate() {
        let is_last_chrom = chrom_index + 1 == chrom_ranges.len();
        let mut group_start = range.start;
        while group_start < range.end {
            let group_end = range.end.min(group_start + num_bins);
            let count = group_end - group_start;
            let is_final = is_last_chrom && group_end == range.end;
            if !is_final && (count as f64) < num_bins as f64 / 2.0 {
                warn!("{chrom} has few bins ({count}). Skipping it");
            } else {
                groups.push(group_start..group_end);
            }
            group_start = group_end;
        }
    }
    groups
}

/// Merges groups of `num_bins` consecutive bins into single bins, summing their counts.
/// The merged bin spans from the start of its first member to the end of its last, and
/// carries the mean coverage of its members.
/// # Arguments
/// * `matrix` - the input contact matrix
/// * `num_bins` - number of consecutive bins to merge; 1 is the identity
/// # Errors
/// * if `num_bins` is zero
pub fn merge_bins(matrix: &ContactMatrix, num_bins: usize) -> anyhow::Result<ContactMatrix> {
    ensure!(num_bins > 0, "number of bins to merge must be > 0");
    if num_bins == 1 {
        return Ok(matrix.clone());
    }

    let bins = matrix.bins();
    let groups = group_bins(&matrix.chrom_bin_ranges(), num_bins);

    // bins in dropped groups have no assignment and their counts are discarded
    let mut assignment: Vec<Option<u32>> = vec![None; bins.len()];
    let mut new_bins: Vec<MatrixBin> = Vec::with_capacity(groups.len());
    for (group_index, group) in groups.iter().enumerate() {
        for old_index in group.clone() {
            assignment[old_index] = Some(group_index as u32);
        }

        let members = &bins[group.clone()];
        let coverage = members.iter().map(|b| b.coverage).sum::<f64>() / members.len() as f64;
        new_bins.push(MatrixBin::new(
            members[0].chrom.clone(),
            members[0].start,
            members[members.len() - 1].end,
            coverage,
        ));
    }

    // group assignments are monotonic, so upper-triangle entries stay upper-triangle
    let mut merged: FxHashMap<(u32, u32), f64> = Default::default();
    for (&(bin1, bin2), &value) in matrix.counts().iter() {
        if let (Some(group1), Some(group2)) = (assignment[bin1 as usize], assignment[bin2 as usize]) {
            *merged.entry((group1, group2)).or_insert(0.0) += value;
        }
    }

    let triplets: Vec<(u32, u32, f64)> = merged.into_iter().map(|((b1, b2), v)| (b1, b2, v)).collect();
    Ok(ContactMatrix::new(new_bins, triplets)?)
}

/// Smooths the matrix with a running window without changing its resolution.
/// Each upper-triangle entry is replicated at every offset within the window; placements
/// outside the matrix or below the diagonal are discarded.
/// # Arguments
/// * `matrix` - the input contact matrix
/// * `num_bins` - the window width, which must be odd; 1 is the identity
/// # Errors
/// * if `num_bins` is zero or even
pub fn running_window_merge(matrix: &ContactMatrix, num_bins: usize) -> anyhow::Result<ContactMatrix> {
    ensure!(num_bins > 0, "window width must be > 0");
    if num_bins == 1 {
        return Ok(matrix.clone());
    }
    ensure!(num_bins % 2 == 1, "window width must be an odd number");

    let half = (num_bins as i64 - 1) / 2;
    let matrix_len = matrix.num_bins() as i64;

    let mut smoothed: FxHashMap<(u32, u32), f64> = Default::default();
    for (&(bin1, bin2), &value) in matrix.counts().iter() {
        for row_offset in -half..=half {
            for col_offset in -half..=half {
                let row = bin1 as i64 + row_offset;
                let col = bin2 as i64 + col_offset;
                let in_range = row >= 0 && row < matrix_len && col >= 0 && col < matrix_len;
                if in_range && row <= col {
                    *smoothed.entry((row as u32, col as u32)).or_insert(0.0) += value;
                }
            }
        }
    }

    let triplets: Vec<(u32, u32, f64)> = smoothed.into_iter().map(|((b1, b2), v)| (b1, b2, v)).collect();
    Ok(ContactMatrix::new(matrix.bins().to_vec(), triplets)?)
}

#[cfg(test)]
mod tests {
    use approx_eq::assert_approx_eq;

    use super::*;

    /// Builds the 5-bin example matrix: 4 bins on "a", 1 bin on "b", with the dense form
    /// [[50, 10,  5,  3,   0],
    ///  [10, 60, 15,  5,   1],
    ///  [ 5, 15, 80,  7,   3],
    ///  [ 3,  5,  7, 90,   1],
    ///  [ 0,  1,  3,  1, 100]]
    fn five_bin_matrix() -> ContactMatrix {
        let bins = vec![
            MatrixBin::new("a".to_string(), 0, 10, 0.5),
            MatrixBin::new("a".to_string(), 10, 20, 1.0),
            MatrixBin::new("a".to_string(), 20, 30, 1.0),
            MatrixBin::new("a".to_string(), 30, 40, 0.1),
            MatrixBin::new("b".to_string(), 40, 50, 1.0),
        ];
        let triplets = vec![
            (0, 0, 50.0), (0, 1, 10.0), (0, 2, 5.0), (0, 3, 3.0),
            (1, 1, 60.0), (1, 2, 15.0), (1, 3, 5.0), (1, 4, 1.0),
            (2, 2, 80.0), (2, 3, 7.0), (2, 4, 3.0),
            (3, 3, 90.0), (3, 4, 1.0),
            (4, 4, 100.0),
        ];
        ContactMatrix::new(bins, triplets).unwrap()
    }

    /// Builds an all-ones upper triangle over `num_bins` bins on one chromosome
    fn all_ones_matrix(num_bins: usize) -> ContactMatrix {
        let bins: Vec<MatrixBin> = (0..num_bins)
            .map(|i| MatrixBin::new("a".to_string(), i as u64 * 10, (i as u64 + 1) * 10, 1.0))
            .collect();
        let mut triplets = vec![];
        for i in 0..num_bins as u32 {
            for j in i..num_bins as u32 {
                triplets.push((i, j, 1.0));
            }
        }
        ContactMatrix::new(bins, triplets).unwrap()
    }

    #[test]
    fn test_merge_bins_pairs() {
        let merged = merge_bins(&five_bin_matrix(), 2).unwrap();

        // intervals: [a:0-20, a:20-40, b:40-50] with averaged coverage
        let bins = merged.bins();
        assert_eq!(bins.len(), 3);
        assert_eq!((bins[0].chrom.as_str(), bins[0].start, bins[0].end), ("a", 0, 20));
        assert_eq!((bins[1].chrom.as_str(), bins[1].start, bins[1].end), ("a", 20, 40));
        assert_eq!((bins[2].chrom.as_str(), bins[2].start, bins[2].end), ("b", 40, 50));
        assert_approx_eq!(bins[0].coverage, 0.75);
        assert_approx_eq!(bins[1].coverage, 0.55);
        assert_approx_eq!(bins[2].coverage, 1.0);

        assert_eq!(
            merged.sorted_triplets(),
            vec![
                (0, 0, 120.0), (0, 1, 28.0), (0, 2, 1.0),
                (1, 1, 177.0), (1, 2, 4.0),
                (2, 2, 100.0),
            ]
        );
    }

    #[test]
    fn test_merge_bins_identity() {
        let matrix = five_bin_matrix();
        let merged = merge_bins(&matrix, 1).unwrap();
        assert_eq!(merged.bins(), matrix.bins());
        assert_eq!(merged.sorted_triplets(), matrix.sorted_triplets());
    }

    #[test]
    fn test_merge_bins_drops_short_tail() {
        // 4 bins on "a" merged in threes leaves a 1-bin tail before "b" starts,
        // which is below the num_bins / 2 cutoff and gets dropped
        let bins = vec![
            MatrixBin::new("a".to_string(), 0, 10, 1.0),
            MatrixBin::new("a".to_string(), 10, 20, 1.0),
            MatrixBin::new("a".to_string(), 20, 30, 1.0),
            MatrixBin::new("a".to_string(), 30, 40, 1.0),
            MatrixBin::new("b".to_string(), 0, 10, 1.0),
            MatrixBin::new("b".to_string(), 10, 20, 1.0),
        ];
        let triplets = vec![(0, 0, 1.0), (3, 3, 5.0), (3, 4, 7.0), (4, 5, 2.0)];
        let matrix = ContactMatrix::new(bins, triplets).unwrap();

        let merged = merge_bins(&matrix, 3).unwrap();
        let bins = merged.bins();
        assert_eq!(bins.len(), 2);
        assert_eq!((bins[0].chrom.as_str(), bins[0].start, bins[0].end), ("a", 0, 30));
        assert_eq!((bins[1].chrom.as_str(), bins[1].start, bins[1].end), ("b", 0, 20));

        // counts touching the dropped a:30-40 bin are discarded
        assert_eq!(merged.sorted_triplets(), vec![(0, 0, 1.0), (1, 1, 2.0)]);
    }

    #[test]
    fn test_merge_bins_keeps_final_remainder() {
        // the remainder at the very end of the bin table is kept regardless of size
        let matrix = all_ones_matrix(4);
        let merged = merge_bins(&matrix, 3).unwrap();
        let bins = merged.bins();
        assert_eq!(bins.len(), 2);
        assert_eq!((bins[0].start, bins[0].end), (0, 30));
        assert_eq!((bins[1].start, bins[1].end), (30, 40));
    }

    #[test]
    fn test_running_window_two_bins() {
        // 2x2 all-ones smoothed with window 3 becomes all 3s
        let smoothed = running_window_merge(&all_ones_matrix(2), 3).unwrap();
        assert_eq!(smoothed.bins().len(), 2);
        assert_eq!(
            smoothed.sorted_triplets(),
            vec![(0, 0, 3.0), (0, 1, 3.0), (1, 1, 3.0)]
        );
    }

    #[test]
    fn test_running_window_four_bins() {
        // expected dense form:
        // [[3, 5, 6, 4],
        //  [5, 6, 8, 6],
        //  [6, 8, 6, 5],
        //  [4, 6, 5, 3]]
        let smoothed = running_window_merge(&all_ones_matrix(4), 3).unwrap();
        assert_eq!(
            smoothed.sorted_triplets(),
            vec![
                (0, 0, 3.0), (0, 1, 5.0), (0, 2, 6.0), (0, 3, 4.0),
                (1, 1, 6.0), (1, 2, 8.0), (1, 3, 6.0),
                (2, 2, 6.0), (2, 3, 5.0),
                (3, 3, 3.0),
            ]
        );
    }

    #[test]
    fn test_running_window_identity() {
        let matrix = five_bin_matrix();
        let smoothed = running_window_merge(&matrix, 1).unwrap();
        assert_eq!(smoothed.sorted_triplets(), matrix.sorted_triplets());
    }

    #[test]
    fn test_running_window_rejects_even_width() {
        assert!(running_window_merge(&all_ones_matrix(4), 2).is_err());
    }

    #[test]
    fn test_merge_config_dispatch() {
        let config = MergeConfigBuilder::default()
            .num_bins(3)
            .running_window(true)
            .build()
            .unwrap();
        let smoothed = merge_matrix(&all_ones_matrix(2), config).unwrap();
        assert_eq!(smoothed.sorted_triplets()[0], (0, 0, 3.0));

        let config = MergeConfigBuilder::default().num_bins(2).build().unwrap();
        let merged = merge_matrix(&five_bin_matrix(), config).unwrap();
        assert_eq!(merged.bins().len(), 3);
    }
}
