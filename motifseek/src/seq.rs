//! Linear storage for alphabet-encoded sequences.

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::Index;
use std::ops::Range;
use std::str::FromStr;

use generic_array::GenericArray;

use super::abc::Alphabet;
use super::abc::Symbol;
use super::err::InvalidSymbol;

// --- EncodedSequence ---------------------------------------------------------

/// A biological sequence encoded with an alphabet.
#[derive(Clone, Debug)]
pub struct EncodedSequence<A: Alphabet> {
    alphabet: std::marker::PhantomData<A>,
    data: Vec<A::Symbol>,
}

impl<A: Alphabet> EncodedSequence<A> {
    /// Create a new encoded sequence.
    pub fn new(data: Vec<A::Symbol>) -> Self {
        Self {
            data,
            alphabet: std::marker::PhantomData,
        }
    }

    /// Create a new encoded sequence from a textual representation.
    pub fn encode<S: AsRef<[u8]>>(sequence: S) -> Result<Self, InvalidSymbol> {
        sequence
            .as_ref()
            .iter()
            .map(|&c| A::Symbol::from_ascii(c))
            .collect::<Result<_, _>>()
            .map(Self::new)
    }

    /// Return the number of symbols in the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over the symbols in the sequence.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, A::Symbol> {
        self.data.iter()
    }

    /// Get the symbols of the window of length `m` starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if the window does not fit in the sequence.
    #[inline]
    pub fn window(&self, start: usize, m: usize) -> &[A::Symbol] {
        &self.data[start..start + m]
    }

    /// Get the range of valid window starts for a motif of length `m`.
    ///
    /// The range is empty when the sequence is shorter than the motif.
    #[inline]
    pub fn starts(&self, m: usize) -> Range<usize> {
        0..(self.data.len() + 1).saturating_sub(m)
    }

    /// Iterate over all the windows of length `m` in the sequence.
    #[inline]
    pub fn windows(&self, m: usize) -> std::slice::Windows<'_, A::Symbol> {
        self.data.windows(m)
    }
}

impl<A: Alphabet> AsRef<EncodedSequence<A>> for EncodedSequence<A> {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<A: Alphabet> AsRef<[<A as Alphabet>::Symbol]> for EncodedSequence<A> {
    fn as_ref(&self) -> &[<A as Alphabet>::Symbol] {
        self.data.as_slice()
    }
}

impl<A: Alphabet> Default for EncodedSequence<A> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<A: Alphabet> Display for EncodedSequence<A> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for c in self.data.iter() {
            write!(f, "{}", c.as_char())?;
        }
        Ok(())
    }
}

impl<A: Alphabet> FromStr for EncodedSequence<A> {
    type Err = InvalidSymbol;
    fn from_str(seq: &str) -> Result<Self, Self::Err> {
        seq.chars()
            .map(A::Symbol::from_char)
            .collect::<Result<_, _>>()
            .map(Self::new)
    }
}

impl<A: Alphabet> From<Vec<A::Symbol>> for EncodedSequence<A> {
    fn from(data: Vec<A::Symbol>) -> Self {
        Self::new(data)
    }
}

impl<A: Alphabet> Index<usize> for EncodedSequence<A> {
    type Output = A::Symbol;
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a, A: Alphabet> IntoIterator for &'a EncodedSequence<A> {
    type Item = &'a A::Symbol;
    type IntoIter = std::slice::Iter<'a, A::Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<A, S> PartialEq<S> for EncodedSequence<A>
where
    A: Alphabet,
    S: AsRef<[<A as Alphabet>::Symbol]>,
{
    fn eq(&self, other: &S) -> bool {
        self.data.as_slice() == other.as_ref()
    }
}

// --- SymbolCount -------------------------------------------------------------

/// A trait for counting the number of occurences of a symbol in a sequence.
pub trait SymbolCount<A: Alphabet> {
    /// Count the occurences of the given symbol.
    fn count_symbol(&self, symbol: A::Symbol) -> usize;

    /// Count the occurences of every symbol of the alphabet.
    fn count_symbols(&self) -> GenericArray<usize, A::K> {
        let mut counts = GenericArray::<usize, A::K>::default();
        for s in A::symbols() {
            counts[s.as_index()] = self.count_symbol(*s);
        }
        counts
    }
}

impl<A: Alphabet> SymbolCount<A> for EncodedSequence<A> {
    fn count_symbol(&self, symbol: A::Symbol) -> usize {
        self.data.iter().filter(|&&s| s == symbol).count()
    }

    fn count_symbols(&self) -> GenericArray<usize, A::K> {
        let mut counts = GenericArray::<usize, A::K>::default();
        for s in self.data.iter() {
            counts[s.as_index()] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::abc::Dna;
    use crate::abc::Nucleotide;
    use crate::abc::Nucleotide::*;

    #[test]
    fn test_encode() {
        let seq = EncodedSequence::<Dna>::encode("ACgt").unwrap();
        assert_eq!(seq, [A, C, G, T]);
        assert_eq!(seq.to_string(), "ACGT");

        let err = EncodedSequence::<Dna>::encode("ACNT").unwrap_err();
        assert_eq!(err.0, 'N');
    }

    #[test]
    fn test_windows() {
        let seq = EncodedSequence::<Dna>::from_str("ACGTA").unwrap();
        assert_eq!(seq.starts(4), 0..2);
        assert_eq!(seq.starts(5), 0..1);
        assert_eq!(seq.starts(6), 0..0);
        assert_eq!(seq.window(1, 4), &[C, G, T, A]);
        assert_eq!(seq.windows(4).count(), 2);
    }

    #[test]
    fn test_count_symbols() {
        let seq = EncodedSequence::<Dna>::from_str("AACGTTTA").unwrap();
        assert_eq!(seq.count_symbol(Nucleotide::T), 3);
        assert_eq!(seq.count_symbols().as_slice(), &[3, 1, 1, 3]);
    }
}
