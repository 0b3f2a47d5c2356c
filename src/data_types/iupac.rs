#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum IupacError {
    #[error("pattern must not be empty")]
    EmptyPattern,
    #[error("invalid IUPAC symbol: {symbol:?}")]
    InvalidSymbol { symbol: char },
}

/// The 15 IUPAC nucleotide codes.
/// Each code represents a set of the four concrete bases, encoded as a 4-bit mask.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IupacBase {
    A,
    C,
    G,
    T,
    /// A or G (purine)
    R,
    /// C or T (pyrimidine)
    Y,
    /// C or G (strong)
    S,
    /// A or T (weak)
    W,
    /// G or T (keto)
    K,
    /// A or C (amino)
    M,
    /// not A
    B,
    /// not C
    D,
    /// not G
    H,
    /// not T
    V,
    /// any base
    N,
}

/// Bit assignments for the concrete bases
const BIT_A: u8 = 0b0001;
const BIT_C: u8 = 0b0010;
const BIT_G: u8 = 0b0100;
const BIT_T: u8 = 0b1000;

impl IupacBase {
    /// Parses a single IUPAC symbol, case-insensitive.
    /// # Arguments
    /// * `symbol` - the ASCII symbol to parse
    /// # Errors
    /// * if the symbol is not one of the 15 IUPAC codes
    pub fn from_ascii(symbol: u8) -> Result<Self, IupacError> {
        match symbol.to_ascii_uppercase() {
            b'A' => Ok(IupacBase::A),
            b'C' => Ok(IupacBase::C),
            b'G' => Ok(IupacBase::G),
            b'T' => Ok(IupacBase::T),
            b'R' => Ok(IupacBase::R),
            b'Y' => Ok(IupacBase::Y),
            b'S' => Ok(IupacBase::S),
            b'W' => Ok(IupacBase::W),
            b'K' => Ok(IupacBase::K),
            b'M' => Ok(IupacBase::M),
            b'B' => Ok(IupacBase::B),
            b'D' => Ok(IupacBase::D),
            b'H' => Ok(IupacBase::H),
            b'V' => Ok(IupacBase::V),
            b'N' => Ok(IupacBase::N),
            _ => Err(IupacError::InvalidSymbol { symbol: symbol as char }),
        }
    }

    /// Returns the ASCII representation of this code
    pub fn to_ascii(self) -> u8 {
        match self {
            IupacBase::A => b'A',
            IupacBase::C => b'C',
            IupacBase::G => b'G',
            IupacBase::T => b'T',
            IupacBase::R => b'R',
            IupacBase::Y => b'Y',
            IupacBase::S => b'S',
            IupacBase::W => b'W',
            IupacBase::K => b'K',
            IupacBase::M => b'M',
            IupacBase::B => b'B',
            IupacBase::D => b'D',
            IupacBase::H => b'H',
            IupacBase::V => b'V',
            IupacBase::N => b'N',
        }
    }

    /// Returns the 4-bit base-set mask for this code
    pub fn mask(self) -> u8 {
        match self {
            IupacBase::A => BIT_A,
            IupacBase::C => BIT_C,
            IupacBase::G => BIT_G,
            IupacBase::T => BIT_T,
            IupacBase::R => BIT_A | BIT_G,
            IupacBase::Y => BIT_C | BIT_T,
            IupacBase::S => BIT_C | BIT_G,
            IupacBase::W => BIT_A | BIT_T,
            IupacBase::K => BIT_G | BIT_T,
            IupacBase::M => BIT_A | BIT_C,
            IupacBase::B => BIT_C | BIT_G | BIT_T,
            IupacBase::D => BIT_A | BIT_G | BIT_T,
            IupacBase::H => BIT_A | BIT_C | BIT_T,
            IupacBase::V => BIT_A | BIT_C | BIT_G,
            IupacBase::N => BIT_A | BIT_C | BIT_G | BIT_T,
        }
    }

    /// Returns the complement code, e.g. R (A/G) -> Y (T/C)
    pub fn complement(self) -> Self {
        match self {
            IupacBase::A => IupacBase::T,
            IupacBase::C => IupacBase::G,
            IupacBase::G => IupacBase::C,
            IupacBase::T => IupacBase::A,
            IupacBase::R => IupacBase::Y,
            IupacBase::Y => IupacBase::R,
            IupacBase::S => IupacBase::S,
            IupacBase::W => IupacBase::W,
            IupacBase::K => IupacBase::M,
            IupacBase::M => IupacBase::K,
            IupacBase::B => IupacBase::V,
            IupacBase::D => IupacBase::H,
            IupacBase::H => IupacBase::D,
            IupacBase::V => IupacBase::B,
            IupacBase::N => IupacBase::N,
        }
    }

    /// Returns true if this code matches a raw sequence base.
    /// Only concrete A/C/G/T sequence bases (either case) can match; anything else
    /// in the sequence (N, gaps, ambiguity codes) matches no pattern base.
    pub fn matches(self, sequence_base: u8) -> bool {
        (self.mask() & sequence_base_mask(sequence_base)) != 0
    }
}

/// Returns the base-set mask of a raw sequence byte, or 0 for non-A/C/G/T bytes
pub fn sequence_base_mask(sequence_base: u8) -> u8 {
    match sequence_base.to_ascii_uppercase() {
        b'A' => BIT_A,
        b'C' => BIT_C,
        b'G' => BIT_G,
        b'T' => BIT_T,
        _ => 0,
    }
}

/// Parses a full IUPAC pattern string, case-insensitive.
/// # Arguments
/// * `pattern` - the pattern to parse, e.g. "GATC" or "GANTC"
/// # Errors
/// * if the pattern is empty or contains a non-IUPAC symbol
pub fn parse_pattern(pattern: &str) -> Result<Vec<IupacBase>, IupacError> {
    if pattern.is_empty() {
        return Err(IupacError::EmptyPattern);
    }
    pattern.bytes().map(IupacBase::from_ascii).collect()
}

/// Returns the reverse complement of an IUPAC pattern
pub fn reverse_complement(pattern: &[IupacBase]) -> Vec<IupacBase> {
    pattern.iter().rev().map(|b| b.complement()).collect()
}

/// Renders a pattern back into its ASCII string form
pub fn pattern_string(pattern: &[IupacBase]) -> String {
    pattern.iter().map(|b| b.to_ascii() as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern() {
        let pattern = parse_pattern("gaTc").unwrap();
        assert_eq!(pattern, vec![IupacBase::G, IupacBase::A, IupacBase::T, IupacBase::C]);
        assert_eq!(pattern_string(&pattern), "GATC");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_pattern(""), Err(IupacError::EmptyPattern));
        assert_eq!(parse_pattern("GAXC"), Err(IupacError::InvalidSymbol { symbol: 'X' }));
    }

    #[test]
    fn test_reverse_complement() {
        // HinfI: GANTC is its own reverse complement
        let pattern = parse_pattern("GANTC").unwrap();
        assert_eq!(reverse_complement(&pattern), pattern);

        // ApoI: RAATTY -> RAATTY as well, so pick something asymmetric
        let pattern = parse_pattern("ACGGT").unwrap();
        let rc = reverse_complement(&pattern);
        assert_eq!(pattern_string(&rc), "ACCGT");
        assert_eq!(reverse_complement(&rc), pattern);
    }

    #[test]
    fn test_matching() {
        assert!(IupacBase::N.matches(b'a'));
        assert!(IupacBase::N.matches(b'T'));
        assert!(IupacBase::R.matches(b'G'));
        assert!(!IupacBase::R.matches(b'C'));

        // sequence-side ambiguity never matches, mirrors regex classes over [ACGT]
        assert!(!IupacBase::N.matches(b'N'));
        assert!(!IupacBase::A.matches(b'-'));
    }
}
