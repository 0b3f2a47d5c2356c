use anyhow::bail;
use clap::Args;
use log::info;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, FULL_VERSION};
use crate::data_types::restriction_enzyme::{KnownEnzyme, RestrictionEnzyme};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about)]
pub struct FindSitesSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    hictools_version: String,

    /// Reference FASTA file
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "FASTA")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference_fn: PathBuf,

    /// Output BED file of restriction sites; ".gz" enables compression
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "out-bed")]
    #[clap(value_name = "BED")]
    #[clap(help_heading = Some("Input/Output"))]
    pub out_bed_fn: PathBuf,

    /// Optional output summary file with per-chromosome digest statistics (CSV/TSV)
    #[clap(long = "output-summary")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_summary_filename: Option<PathBuf>,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// A preset restriction enzyme to digest with; may be given multiple times
    #[clap(short = 'e')]
    #[clap(long = "enzyme")]
    #[clap(value_name = "ENZYME")]
    #[clap(help_heading = Some("Digest parameters"))]
    pub enzymes: Vec<KnownEnzyme>,

    /// A custom IUPAC recognition pattern to digest with; may be given multiple times
    #[clap(short = 'p')]
    #[clap(long = "search-pattern")]
    #[clap(value_name = "IUPAC")]
    #[clap(help_heading = Some("Digest parameters"))]
    pub search_patterns: Vec<String>,

    /// Number of threads to use in the scanning step
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_find_sites_settings(mut settings: FindSitesSettings) -> anyhow::Result<FindSitesSettings> {
    // hard code the version in
    settings.hictools_version = FULL_VERSION.clone();
    info!("hictools version: {:?}", &settings.hictools_version);
    info!("Sub-command: find-sites");
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.reference_fn, "Reference FASTA")?;
    info!("\tReference: {:?}", &settings.reference_fn);

    if settings.enzymes.is_empty() && settings.search_patterns.is_empty() {
        bail!("At least one --enzyme or --search-pattern is required");
    }
    info!("Digest parameters:");
    for enzyme in settings.enzymes.iter() {
        info!("\tEnzyme: {} ({})", enzyme, enzyme.recognition_pattern());
    }
    for pattern in settings.search_patterns.iter() {
        info!("\tSearch pattern: {pattern:?}");
    }

    // outputs
    info!("Outputs:");
    info!("\tSite BED: {:?}", &settings.out_bed_fn);
    if let Some(filename) = settings.output_summary_filename.as_deref() {
        info!("\tSummary: {filename:?}");
    } else {
        info!("\tSummary: None");
    }
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}

/// Builds the enzyme set from the preset selections and the custom patterns.
/// Custom patterns are labeled by their uppercase pattern string.
/// # Arguments
/// * `settings` - the checked CLI settings
/// # Errors
/// * if a custom pattern is not valid IUPAC
/// * if two selections share a label or a recognition pattern
pub fn build_enzyme_set(settings: &FindSitesSettings) -> anyhow::Result<Vec<RestrictionEnzyme>> {
    let mut enzyme_set: Vec<RestrictionEnzyme> = vec![];
    for &enzyme in settings.enzymes.iter() {
        enzyme_set.push(RestrictionEnzyme::from_known(enzyme));
    }
    for pattern in settings.search_patterns.iter() {
        let enzyme = RestrictionEnzyme::new(pattern.to_uppercase(), pattern)?;
        enzyme_set.push(enzyme);
    }

    // duplicate labels would make the BED output ambiguous; duplicate patterns
    // (isoschizomers like DpnII/MboI, or a preset repeated via -p) would report
    // every site once per selection
    let mut seen_labels: BTreeSet<&str> = Default::default();
    let mut seen_patterns: BTreeSet<String> = Default::default();
    for enzyme in enzyme_set.iter() {
        if !seen_labels.insert(enzyme.label()) {
            bail!("Duplicate enzyme selection: {}", enzyme.label());
        }
        if !seen_patterns.insert(enzyme.pattern_string()) {
            bail!(
                "Enzyme selection {} repeats recognition pattern {}",
                enzyme.label(), enzyme.pattern_string()
            );
        }
    }

    Ok(enzyme_set)
}
