use log::{error, info, LevelFilter};
use rust_lib_reference_genome::reference_genome::ReferenceGenome;
use std::time::Instant;

use hictools::bin_merge::{merge_matrix, MergeConfigBuilder};
use hictools::cli::core::{get_cli, Commands};
use hictools::cli::find_sites::{build_enzyme_set, check_find_sites_settings, FindSitesSettings};
use hictools::cli::merge_bins::{check_merge_bins_settings, MergeBinsSettings};
use hictools::parsing::matrix_text::load_contact_matrix;
use hictools::site_search::{find_restriction_sites, ChromosomeSites};
use hictools::util::json_io::save_json;
use hictools::writers::bed::BedWriter;
use hictools::writers::matrix_text::save_contact_matrix;
use hictools::writers::site_summary::SiteSummaryWriter;

/// Sets up env_logger from the -v count; shared by both subcommands
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Writes the CLI settings into the debug folder if one was requested
fn save_debug_settings<T: serde::Serialize>(settings: &T, debug_folder: Option<&std::path::Path>) {
    if let Some(debug_folder) = debug_folder {
        info!("Creating debug folder at {debug_folder:?}...");
        match std::fs::create_dir_all(debug_folder) {
            Ok(()) => {},
            Err(e) => {
                error!("Error while creating debug folder: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }

        let cli_json = debug_folder.join("cli_settings.json");
        info!("Saving CLI options to {cli_json:?}...");
        if let Err(e) = save_json(settings, &cli_json) {
            error!("Error while saving CLI options: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }
}

fn run_find_sites(settings: FindSitesSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_find_sites_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // set up the number of threads for rayon
    match rayon::ThreadPoolBuilder::new().num_threads(settings.threads).build_global() {
        Ok(()) => {},
        Err(e) => {
            error!("Error while building thread pool: {e}");
            std::process::exit(exitcode::OSERR);
        }
    };

    save_debug_settings(&settings, settings.debug_folder.as_deref());

    // resolve the digest before the expensive reference load
    let enzyme_set = match build_enzyme_set(&settings) {
        Ok(es) => es,
        Err(e) => {
            error!("Error while building enzyme set: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // load the reference genome
    info!("Pre-loading reference genome into memory...");
    let reference_genome = match ReferenceGenome::from_fasta(&settings.reference_fn) {
        Ok(rg) => rg,
        Err(e) => {
            error!("Error while loading reference genome: {e:?}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // scan each chromosome in parallel; results come back in reference order
    info!("Scanning chromosomes for restriction sites...");
    let all_results: Vec<ChromosomeSites> = find_restriction_sites(&reference_genome, &enzyme_set);
    info!("Chromosome scans complete, saving all outputs...");

    // write the BED output
    let mut bed_writer = match BedWriter::new(&settings.out_bed_fn) {
        Ok(bw) => bw,
        Err(e) => {
            error!("Error while creating BED writer: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };
    let mut total_sites: u64 = 0;
    for chrom_sites in all_results.iter() {
        total_sites += chrom_sites.sites.len() as u64;
        if let Err(e) = bed_writer.write_chromosome(chrom_sites) {
            error!("Error while writing BED output: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }
    if let Err(e) = bed_writer.finish() {
        error!("Error while finalizing BED output: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    // write the optional summary
    if let Some(summary_fn) = settings.output_summary_filename.as_deref() {
        info!("Saving output summary to {summary_fn:?}...");
        let labels: Vec<String> = enzyme_set.iter().map(|e| e.label().to_string()).collect();
        let result = SiteSummaryWriter::new(summary_fn)
            .and_then(|mut writer| {
                for chrom_sites in all_results.iter() {
                    writer.write_chromosome(chrom_sites, &labels)?;
                }
                writer.finish()
            });
        if let Err(e) = result {
            error!("Error while saving summary file: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Found {total_sites} restriction sites across {} chromosomes.", all_results.len());
    info!("Digest completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_merge_bins(settings: MergeBinsSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_merge_bins_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    save_debug_settings(&settings, settings.debug_folder.as_deref());

    // load the input matrix
    info!("Loading contact matrix into memory...");
    let matrix = match load_contact_matrix(&settings.bins_fn, &settings.matrix_fn) {
        Ok(m) => m,
        Err(e) => {
            error!("Error while loading contact matrix: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!("Loaded {} bins and {} counts.", matrix.num_bins(), matrix.counts().len());

    // build our merge configuration
    let merge_config = match MergeConfigBuilder::default()
        .num_bins(settings.num_bins)
        .running_window(settings.running_window)
        .build() {
        Ok(mc) => mc,
        Err(e) => {
            error!("Error while building merge config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    info!("Merging matrix bins...");
    let merged_matrix = match merge_matrix(&matrix, merge_config) {
        Ok(m) => m,
        Err(e) => {
            error!("Error while merging matrix bins: {e:#}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };
    let masked_bins = merged_matrix.masked_bins();
    if !masked_bins.is_empty() {
        info!("Merged matrix has {} bins with no counts.", masked_bins.len());
    }

    info!("Saving merged matrix...");
    if let Err(e) = save_contact_matrix(&merged_matrix, &settings.out_bins_fn, &settings.out_matrix_fn) {
        error!("Error while saving merged matrix: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Merged {} bins into {}.", matrix.num_bins(), merged_matrix.num_bins());
    info!("Merge completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::FindSites(settings) => {
            run_find_sites(*settings);
        },
        Commands::MergeBins(settings) => {
            run_merge_bins(*settings);
        }
    }

    info!("Process finished successfully.");
}
