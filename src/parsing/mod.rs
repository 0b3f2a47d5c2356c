/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Loaders for the text representation of a contact matrix
pub mod matrix_text;
