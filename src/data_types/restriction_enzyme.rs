use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::data_types::iupac::{
    parse_pattern, pattern_string, reverse_complement, IupacBase, IupacError,
};

/// Restriction enzymes with built-in recognition patterns.
/// These cover the enzymes commonly used in Hi-C library preparation.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq, Serialize, clap::ValueEnum)]
pub enum KnownEnzyme {
    #[strum(ascii_case_insensitive)]
    #[clap(name = "DpnII")]
    DpnII,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "MboI")]
    MboI,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "Sau3AI")]
    Sau3AI,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "HindIII")]
    HindIII,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "EcoRI")]
    EcoRI,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "BglII")]
    BglII,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "NcoI")]
    NcoI,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "Csp6I")]
    Csp6I,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "CviQI")]
    CviQI,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "HinfI")]
    HinfI,
    #[strum(ascii_case_insensitive)]
    #[clap(name = "ApoI")]
    ApoI,
}

impl KnownEnzyme {
    /// Returns the IUPAC recognition pattern for this enzyme
    pub fn recognition_pattern(self) -> &'static str {
        match self {
            KnownEnzyme::DpnII => "GATC",
            KnownEnzyme::MboI => "GATC",
            KnownEnzyme::Sau3AI => "GATC",
            KnownEnzyme::HindIII => "AAGCTT",
            KnownEnzyme::EcoRI => "GAATTC",
            KnownEnzyme::BglII => "AGATCT",
            KnownEnzyme::NcoI => "CCATGG",
            KnownEnzyme::Csp6I => "GTAC",
            KnownEnzyme::CviQI => "GTAC",
            KnownEnzyme::HinfI => "GANTC",
            KnownEnzyme::ApoI => "RAATTY",
        }
    }
}

/// A labeled restriction enzyme recognition pattern.
/// The reverse complement is pre-computed so scanning can check both strands.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RestrictionEnzyme {
    /// Display label, e.g. the enzyme name or the raw pattern
    label: String,
    /// Forward-strand recognition pattern
    forward: Vec<IupacBase>,
    /// Reverse complement of the forward pattern
    reverse: Vec<IupacBase>,
    /// True if forward == reverse, in which case only one strand is scanned
    palindromic: bool,
}

impl RestrictionEnzyme {
    /// Creates a new enzyme from a label and an IUPAC pattern string.
    /// # Arguments
    /// * `label` - the display label for outputs
    /// * `pattern` - the recognition pattern, case-insensitive IUPAC
    /// # Errors
    /// * if the pattern is empty or contains non-IUPAC symbols
    pub fn new(label: String, pattern: &str) -> Result<Self, IupacError> {
        let forward = parse_pattern(pattern)?;
        let reverse = reverse_complement(&forward);
        let palindromic = forward == reverse;
        Ok(Self {
            label,
            forward,
            reverse,
            palindromic,
        })
    }

    /// Creates an enzyme from the preset table
    pub fn from_known(enzyme: KnownEnzyme) -> Self {
        // preset patterns are fixed strings, parsing cannot fail
        Self::new(enzyme.to_string(), enzyme.recognition_pattern()).unwrap()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn forward(&self) -> &[IupacBase] {
        &self.forward
    }

    pub fn reverse(&self) -> &[IupacBase] {
        &self.reverse
    }

    pub fn is_palindromic(&self) -> bool {
        self.palindromic
    }

    /// Length of the recognition site in bp
    pub fn site_len(&self) -> usize {
        self.forward.len()
    }

    /// The forward pattern as a display string
    pub fn pattern_string(&self) -> String {
        pattern_string(&self.forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_palindromic_preset() {
        let enzyme = RestrictionEnzyme::from_known(KnownEnzyme::DpnII);
        assert_eq!(enzyme.label(), "DpnII");
        assert_eq!(enzyme.pattern_string(), "GATC");
        assert!(enzyme.is_palindromic());
        assert_eq!(enzyme.site_len(), 4);
    }

    #[test]
    fn test_non_palindromic_pattern() {
        let enzyme = RestrictionEnzyme::new("custom".to_string(), "AAC").unwrap();
        assert!(!enzyme.is_palindromic());
        assert_eq!(pattern_string(enzyme.reverse()), "GTT");
    }

    #[test]
    fn test_ambiguous_preset_is_palindromic() {
        // RAATTY reverse complements to itself
        let enzyme = RestrictionEnzyme::from_known(KnownEnzyme::ApoI);
        assert!(enzyme.is_palindromic());
    }

    #[test]
    fn test_known_enzyme_from_str() {
        assert_eq!(KnownEnzyme::from_str("dpnii").unwrap(), KnownEnzyme::DpnII);
        assert_eq!(KnownEnzyme::from_str("HindIII").unwrap(), KnownEnzyme::HindIII);
        assert!(KnownEnzyme::from_str("NotAnEnzyme").is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(RestrictionEnzyme::new("bad".to_string(), "GA?C").is_err());
        assert!(RestrictionEnzyme::new("empty".to_string(), "").is_err());
    }
}
