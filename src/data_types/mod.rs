/// Sparse symmetric contact matrix and its bin table
pub mod contact_matrix;
/// The IUPAC nucleotide alphabet and pattern parsing
pub mod iupac;
/// Restriction enzyme definitions, including the preset table
pub mod restriction_enzyme;
