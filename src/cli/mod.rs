/*!
# CLI module
Command line interface functionality that is specific to hictools.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The find-sites CLI subcommand
pub mod find_sites;
/// The merge-bins CLI subcommand
pub mod merge_bins;
