/// Contains the bin merging logic for contact matrices
pub mod bin_merge;
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Core logic for locating restriction sites in a reference sequence
pub mod site_search;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
