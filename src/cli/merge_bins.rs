use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about)]
pub struct MergeBinsSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    hictools_version: String,

    /// Input bin table (BED-like TSV: chrom, start, end, optional coverage)
    #[clap(required = true)]
    #[clap(short = 'b')]
    #[clap(long = "bins")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub bins_fn: PathBuf,

    /// Input sparse counts file (TSV: bin1, bin2, value with 0-based indices)
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "matrix")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub matrix_fn: PathBuf,

    /// Output bin table; ".gz" enables compression
    #[clap(required = true)]
    #[clap(long = "out-bins")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub out_bins_fn: PathBuf,

    /// Output sparse counts file; ".gz" enables compression
    #[clap(required = true)]
    #[clap(long = "out-matrix")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub out_matrix_fn: PathBuf,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// Number of consecutive bins to merge
    #[clap(required = true)]
    #[clap(short = 'n')]
    #[clap(long = "num-bins")]
    #[clap(value_name = "INT")]
    #[clap(help_heading = Some("Merge parameters"))]
    pub num_bins: usize,

    /// Smooth with a running window of length --num-bins instead of reducing resolution
    #[clap(long = "running-window")]
    #[clap(help_heading = Some("Merge parameters"))]
    pub running_window: bool,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_merge_bins_settings(mut settings: MergeBinsSettings) -> anyhow::Result<MergeBinsSettings> {
    // hard code the version in
    settings.hictools_version = FULL_VERSION.clone();
    info!("hictools version: {:?}", &settings.hictools_version);
    info!("Sub-command: merge-bins");
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.bins_fn, "Bin table")?;
    check_required_filename(&settings.matrix_fn, "Counts file")?;
    info!("\tBin table: {:?}", &settings.bins_fn);
    info!("\tCounts file: {:?}", &settings.matrix_fn);

    // outputs
    info!("Outputs:");
    info!("\tBin table: {:?}", &settings.out_bins_fn);
    info!("\tCounts file: {:?}", &settings.out_matrix_fn);
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }

    // other misc parameters
    info!("Merge parameters:");
    ensure!(settings.num_bins > 0, "--num-bins must be >0");
    if settings.running_window {
        ensure!(settings.num_bins % 2 == 1, "--num-bins must be odd with --running-window");
    }
    info!("\tBins to merge: {}", settings.num_bins);
    info!("\tRunning window: {}", if settings.running_window { "ENABLED" } else { "DISABLED" });

    Ok(settings)
}
