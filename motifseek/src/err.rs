//! Error types for motif discovery.

use std::fmt::Display;
use std::fmt::Formatter;

/// The given character is not a valid symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSymbol(pub char);

impl Display for InvalidSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid symbol: {:?}", self.0)
    }
}

impl std::error::Error for InvalidSymbol {}

/// Invalid data was passed to initialize a matrix or a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidData;

impl Display for InvalidData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid data")
    }
}

impl std::error::Error for InvalidData {}

/// The reason a sequence was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceErrorKind {
    /// The sequence has fewer symbols than the motif.
    TooShort { length: usize, motif_length: usize },
    /// The sequence contains a character outside of the alphabet.
    InvalidSymbol(char),
}

/// An error raised during motif discovery.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A search parameter is out of its valid range.
    InvalidArgument(&'static str),
    /// A sequence of the corpus cannot be used for the search.
    InvalidSequence {
        index: usize,
        kind: SequenceErrorKind,
    },
    /// Sampling was attempted from weights that do not form a distribution.
    DegenerateDistribution,
    /// The information content kept improving past the cycle limit.
    NonTermination { cycles: usize },
}

impl Error {
    pub(crate) fn invalid_symbol(index: usize, symbol: InvalidSymbol) -> Self {
        Error::InvalidSequence {
            index,
            kind: SequenceErrorKind::InvalidSymbol(symbol.0),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::InvalidSequence {
                index,
                kind: SequenceErrorKind::TooShort {
                    length,
                    motif_length,
                },
            } => write!(
                f,
                "invalid sequence #{}: length {} is shorter than the motif length {}",
                index, length, motif_length
            ),
            Error::InvalidSequence {
                index,
                kind: SequenceErrorKind::InvalidSymbol(c),
            } => write!(f, "invalid sequence #{}: unexpected character {:?}", index, c),
            Error::DegenerateDistribution => {
                f.write_str("cannot sample from weights that do not sum to a positive value")
            }
            Error::NonTermination { cycles } => {
                write!(f, "search did not converge after {} cycles", cycles)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<InvalidData> for Error {
    fn from(_error: InvalidData) -> Self {
        Error::InvalidArgument("invalid data")
    }
}
